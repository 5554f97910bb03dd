//! A small product catalog filtered by color and size.
//!
//! Run with logging enabled to watch the pipeline:
//!
//! ```sh
//! RUST_LOG=faceted=debug cargo run --example catalog
//! ```

use std::time::Instant;

use faceted::prelude::*;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ContainerConfig::new()
        .with_count_labels("product", "products")
        .with_key("size", KeyConfig::new().with_delimiter(","));
    let mut container = FilterContainer::with_in_memory_url(config);

    let red = container.add_control(BoundControl::toggle("color", "red"));
    let _blue = container.add_control(BoundControl::toggle("color", "blue"));
    let _xl = container.add_control(BoundControl::toggle("size", "xl"));

    let items = [
        ("red shirt", "red", "s,m,xl"),
        ("blue shirt", "blue", "s,m"),
        ("red hat", "red", "m"),
    ];
    for (name, color, sizes) in items {
        let id = container.add_item(
            FilterableItem::new()
                .with_tag("color", color)
                .with_tag("size", sizes),
        );
        println!("added {name} as {id:?}");
    }

    container.signals().count_rendered.connect(|text| {
        println!("=> {text}");
    });
    container.signals().item_visibility_changed.connect(|(item, visible)| {
        println!("   {item:?} visible: {visible}");
    });

    println!("selecting color=red");
    container.set_control_selected(red, true).unwrap();
    container.apply_control(red).unwrap();
    container.pump(Instant::now());

    println!("query is now: ?{}", container.current_query());
}
