//! Cache lifecycle and configuration discovery through the engine façade

use introspector_core::{EngineConfig, Error, Introspector, SessionState};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

#[test]
fn test_config_file_drives_cache_capacity() {
    let temp_dir = TempDir::new().unwrap();
    let project = temp_dir.path().join("project");
    let package = project.join("pkg");
    std::fs::create_dir_all(&package).unwrap();
    let config = serde_json::json!({ "max_cache_entries": 1 });
    std::fs::write(
        project.join(".introspector.json"),
        serde_json::to_string_pretty(&config).unwrap(),
    )
    .unwrap();

    let introspector = Introspector::discover(&package).unwrap();
    assert_eq!(
        introspector.config(),
        &EngineConfig {
            recovery_mode: true,
            max_cache_entries: 1,
        }
    );

    let (a, b) = (package.join("a.py"), package.join("b.py"));
    introspector.parse(&a, "a = 1\n").unwrap();
    introspector.parse(&b, "b = 1\n").unwrap();
    assert_eq!(introspector.state(&a), SessionState::Evicted);
    assert_eq!(introspector.state(&b), SessionState::Parsed);
    assert!(matches!(introspector.snapshot(&a), Err(Error::UnknownFile(_))));
}

#[test]
fn test_parallel_parses_of_different_files() {
    let introspector = Arc::new(Introspector::new());
    let workers: Vec<_> = (0..6)
        .map(|i| {
            let introspector = Arc::clone(&introspector);
            thread::spawn(move || {
                let path = PathBuf::from(format!("worker_{i}.py"));
                let source = format!("def work_{i}(n):\n    return n * {i}\n");
                let handle = introspector.parse(&path, &source).unwrap();
                let names: Vec<String> = handle
                    .variables_in_scope(2)
                    .unwrap()
                    .into_iter()
                    .map(|d| d.name.clone())
                    .collect();
                assert_eq!(names, vec!["n".to_string(), format!("work_{i}")]);
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    for i in 0..6 {
        let path = PathBuf::from(format!("worker_{i}.py"));
        assert_eq!(introspector.state(&path), SessionState::Parsed);
    }
}

#[test]
fn test_reparse_does_not_disturb_held_snapshot() {
    let introspector = Introspector::new();
    let path = PathBuf::from("live.py");
    let old = introspector.parse(&path, "def f(a):\n    return a\n").unwrap();
    let new = introspector
        .parse(&path, "def f(a, b):\n    return a + b\n")
        .unwrap();

    assert_eq!(old.variables_in_scope(2).unwrap().len(), 2);
    assert_eq!(new.variables_in_scope(2).unwrap().len(), 3);
    assert!(introspector.snapshot(&path).unwrap().same_snapshot(&new));

    assert!(introspector.close(&path));
    assert_eq!(old.all_documentation()[0].signature, "def f(a):");
}
