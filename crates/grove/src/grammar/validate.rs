use crate::error::GrammarError;
use crate::grammar::expr::Production;
use crate::syntax::Symbol;

/// Reject grammars where a rule can reach itself without consuming a token.
///
/// Nullability is computed to a fixpoint first, so `a := b? a x` is caught
/// as well as `a := a x`.
///
/// # Errors
///
/// Returns [`GrammarError::LeftRecursion`] with the rule names along the cycle.
pub(crate) fn check_left_recursion(
    rules: &[Option<Production>],
    name_of: impl Fn(Symbol) -> String,
) -> Result<(), GrammarError> {
    let nullable = nullable_rules(rules);
    let is_nullable = |symbol: Symbol| nullable.get(symbol.index()).copied().unwrap_or(false);

    let edges: Vec<Vec<Symbol>> = rules
        .iter()
        .map(|body| {
            let mut out = Vec::new();
            if let Some(body) = body {
                body.leftmost_rules(&is_nullable, &mut out);
            }
            out.sort_unstable();
            out.dedup();
            out
        })
        .collect();

    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Unvisited,
        OnStack,
        Done,
    }

    let mut marks = vec![Mark::Unvisited; rules.len()];
    for root in 0..rules.len() {
        if marks[root] != Mark::Unvisited || rules[root].is_none() {
            continue;
        }

        // Iterative DFS: (rule index, next edge to visit)
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
        marks[root] = Mark::OnStack;
        while let Some(&(node, next)) = stack.last() {
            let Some(&target) = edges[node].get(next) else {
                marks[node] = Mark::Done;
                stack.pop();
                continue;
            };
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }

            match marks.get(target.index()).copied().unwrap_or(Mark::Done) {
                Mark::Unvisited => {
                    marks[target.index()] = Mark::OnStack;
                    stack.push((target.index(), 0));
                }
                Mark::OnStack => {
                    let start = stack
                        .iter()
                        .position(|&(n, _)| n == target.index())
                        .unwrap_or(0);
                    let mut cycle: Vec<String> = stack[start..]
                        .iter()
                        .map(|&(n, _)| name_of(Symbol::from_raw(u16::try_from(n).unwrap_or(0))))
                        .collect();
                    cycle.push(name_of(target));
                    return Err(GrammarError::LeftRecursion { cycle });
                }
                Mark::Done => {}
            }
        }
    }

    Ok(())
}

fn nullable_rules(rules: &[Option<Production>]) -> Vec<bool> {
    let mut nullable = vec![false; rules.len()];
    loop {
        let mut changed = false;
        for (index, body) in rules.iter().enumerate() {
            if nullable[index] {
                continue;
            }
            let current = |symbol: Symbol| nullable.get(symbol.index()).copied().unwrap_or(false);
            if body.as_ref().is_some_and(|body| body.is_nullable(&current)) {
                nullable[index] = true;
                changed = true;
            }
        }
        if !changed {
            return nullable;
        }
    }
}
