#![no_main]
use grove::languages::BUILTIN;
use grove::{GrammarRegistry, Parser};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let parser = Parser::new();
    for &(name, _) in BUILTIN {
        let Ok(grammar) = GrammarRegistry::global().load(name) else {
            return;
        };
        match parser.parse(&grammar, data) {
            Ok(tree) => {
                // Every accepted input is covered by the root
                assert_eq!(tree.root().range().end().to_usize(), data.len());
                assert_eq!(tree.text().as_bytes(), data);
            }
            Err(grove::Error::Encoding(err)) => {
                assert!(std::str::from_utf8(data).is_err());
                assert!(err.valid_up_to <= data.len());
            }
            Err(err) => panic!("unexpected error: {err}"),
        }
    }
});
