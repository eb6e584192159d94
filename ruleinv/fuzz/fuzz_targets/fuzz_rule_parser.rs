#![no_main]

use libfuzzer_sys::fuzz_target;
use ruleinv::Engine;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let mut engine = Engine::new();
        let _ = engine.add_rules_lenient(text, "fuzz.rule");

        // Classification of anything that parsed must not break invariants
        let _ = engine.classify();
        for rule in engine.rules() {
            if let Some(f) = &rule.feasibility {
                assert!(f.check_invariants(rule.len()).is_ok());
            }
        }
    }
});
