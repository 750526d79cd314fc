use multimap_core::generate::{Generate, Rng};
use multimap_core::{Key, MultiMap, Value};

fn main() {
    let mut rng = Rng::new();
    let mut map = MultiMap::new();

    for _ in 0..10_000 {
        let key: Key = Key::generate(&mut rng) % 1_000;
        let value: Value = Value::generate(&mut rng);
        map.add_value(key, value).expect("demo run should not exhaust the allocator");
    }

    map.traverse(|key, value| println!("{key} -> {value}"));
}
