use std::thread;

use funcstuff_core::{
    typ::Type,
    typeclass::{Capability, Registry},
    value::Value,
};

#[test]
fn concurrent_registrations_union() {
    let registry = Registry::new();
    let capabilities: Vec<Capability> = (0..8)
        .map(|i| registry.declare(format!("Cap{i}"), []).unwrap())
        .collect();

    thread::scope(|s| {
        for cap in &capabilities {
            let registry = registry.clone();
            s.spawn(move || registry.derive(Type::Record, cap).unwrap());
        }
    });

    assert_eq!(registry.capabilities_of(Type::Record).len(), 8);
    assert!(registry.satisfies(Type::Record, &capabilities));
}

#[test]
fn global_registry_is_shared_across_threads() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            thread::spawn(move || {
                Registry::global().invoke(&Value::just(i), "==", &[Value::just(i)])
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Ok(Value::Bool(true)));
    }
}
