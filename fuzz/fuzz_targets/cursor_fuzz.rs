#![no_main]
use grove::{GrammarRegistry, Parser};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (u8, &str, Vec<u8>)| {
    let (language, code, moves) = data;
    let name = ["python", "cpp", "javascript"][usize::from(language % 3)];
    let Ok(grammar) = GrammarRegistry::global().load(name) else {
        return;
    };
    let Ok(tree) = Parser::new().parse_str(&grammar, code) else {
        return;
    };

    let mut cursor = tree.cursor();
    for step in moves {
        let before = cursor.path();
        let moved = match step % 5 {
            0 => cursor.goto_first_child(),
            1 => cursor.goto_last_child(),
            2 => cursor.goto_next_sibling(),
            3 => cursor.goto_prev_sibling(),
            _ => cursor.goto_parent(),
        };
        if !moved {
            assert_eq!(cursor.path(), before);
        }

        let node = cursor.current_node();
        assert!(tree.root().range().contains_range(node.range()));
        let path = cursor.path();
        let mut replay = tree.cursor();
        assert!(replay.goto_path(&path));
        assert_eq!(replay.current_node(), node);
    }
});
