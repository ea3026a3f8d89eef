//! Indented text rendering of syntax trees.
//!
//! One line per visible node, depth-first pre-order:
//!
//! ```text
//! module
//!   function_definition
//!     def
//!     identifier (name)
//! ```

use crate::syntax::{Preorder, SyntaxTree, TreeCursor};
use std::fmt::{self, Write};

/// Configuration for [`TreePrinter`]
#[derive(Debug, Clone)]
pub struct PrinterConfig {
    /// Indentation string repeated once per depth level
    pub indent: String,
    /// Append `[start..end]` byte ranges
    pub ranges: bool,
    /// Append `[row, column] - [row, column]` points
    pub points: bool,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            indent: "  ".into(),
            ranges: false,
            points: false,
        }
    }
}

/// Writes a cursor walk as indented lines
#[derive(Debug, Clone, Default)]
pub struct TreePrinter {
    config: PrinterConfig,
}

impl TreePrinter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_config(config: PrinterConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &PrinterConfig {
        &self.config
    }

    /// Render the whole tree.
    #[must_use]
    pub fn print(&self, tree: &SyntaxTree) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.write(tree.cursor(), &mut out);
        out
    }

    /// Render the subtree at the cursor's position into `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if `out` fails to write.
    pub fn write(&self, cursor: TreeCursor<'_>, out: &mut impl Write) -> fmt::Result {
        for visit in Preorder::new(cursor) {
            for _ in 0..visit.depth {
                out.write_str(&self.config.indent)?;
            }
            out.write_str(visit.node.kind())?;
            if let Some(field) = visit.field {
                write!(out, " ({field})")?;
            }
            if self.config.ranges {
                write!(out, " [{}]", visit.node.range())?;
            }
            if self.config.points {
                write!(
                    out,
                    " {} - {}",
                    visit.node.start_point(),
                    visit.node.end_point()
                )?;
            }
            out.write_char('\n')?;
        }
        Ok(())
    }
}
