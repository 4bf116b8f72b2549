use super::manager::TypeManager;
use super::traits::{Kind, TypeView};
use super::types::{Fact, Type};
use bumpalo::Bump;

#[test]
fn test_interning() {
    let bump = Bump::new();
    let manager = TypeManager::new(&bump);

    let int_type = manager.int();
    let float_type = manager.float();

    assert!(core::ptr::eq(int_type, manager.int()));
    assert!(core::ptr::eq(float_type, manager.float()));
    assert!(!core::ptr::eq(int_type, float_type));
}

#[test]
fn test_interning_struct() {
    let bump = Bump::new();
    let manager = TypeManager::new(&bump);

    let user = manager.structure("User", &[("Name", manager.str()), ("Age", manager.int())], &[]);
    let same = manager.structure("User", &[("Name", manager.str()), ("Age", manager.int())], &[]);
    assert!(core::ptr::eq(user, same));

    // Field order is significant: it is the runtime layout.
    let swapped = manager.structure("User", &[("Age", manager.int()), ("Name", manager.str())], &[]);
    assert!(!core::ptr::eq(user, swapped));
}

#[test]
fn test_interning_composites() {
    let bump = Bump::new();
    let manager = TypeManager::new(&bump);

    let ints = manager.array(manager.int());
    assert!(core::ptr::eq(ints, manager.array(manager.int())));

    let scores = manager.map(manager.str(), manager.float());
    assert!(core::ptr::eq(scores, manager.map(manager.str(), manager.float())));

    let f = manager.function(&[manager.int()], manager.bool());
    assert!(core::ptr::eq(f, manager.function(&[manager.int()], manager.bool())));
    assert!(!core::ptr::eq(f, manager.named_function("Pred", &[manager.int()], manager.bool())));
}

#[test]
fn test_view() {
    let bump = Bump::new();
    let manager = TypeManager::new(&bump);

    let greet = manager.function(&[manager.any()], manager.str());
    let user = manager.structure(
        "User",
        &[("Name", manager.str()), ("Age", manager.int())],
        &[("Greet", greet)],
    );
    assert_eq!(user.kind(), Kind::Struct);
    assert_eq!(user.name(), Some("User"));
    assert_eq!(user.field("Age"), Some((1, manager.int())));
    assert_eq!(user.field("Email"), None);
    assert_eq!(user.method("Greet").map(|(i, _)| i), Some(0));

    let map = manager.map(manager.str(), manager.int());
    assert_eq!(map.key(), Some(manager.str()));
    assert_eq!(map.value(), Some(manager.int()));
    assert_eq!(manager.array(map).elem(), Some(map));
}

#[test]
fn test_variadic_signature() {
    let bump = Bump::new();
    let manager = TypeManager::new(&bump);

    let join = manager.variadic_function(
        &[manager.str(), manager.array(manager.str())],
        manager.str(),
    );
    let sig = join.signature().unwrap();
    assert_eq!(sig.arity(), (1, None));
    assert_eq!(sig.param(0), Some(manager.str()));
    assert_eq!(sig.param(5), Some(manager.str()));
}

#[test]
fn test_display() {
    let bump = Bump::new();
    let manager = TypeManager::new(&bump);

    assert_eq!(manager.array(manager.int()).to_string(), "[]int");
    assert_eq!(manager.map(manager.str(), manager.float()).to_string(), "map[string]float");
    let f = manager.variadic_function(&[manager.int(), manager.array(manager.str())], manager.bool());
    assert_eq!(f.to_string(), "func(int, ...string) bool");
}

#[test]
fn test_any_fact_is_unknown() {
    let bump = Bump::new();
    let manager = TypeManager::new(&bump);

    assert_eq!(Fact::of(manager.any()), Fact::Unknown);
    assert!(Fact::of(manager.int()).is(&Type::Int));
    assert_eq!(Fact::Invalid.to_string(), "<invalid>");
}
