use std::hint::black_box;
use std::sync::{Arc, Mutex};

use criterion::{Criterion, criterion_group, criterion_main};
use celblock::logging::NullSink;
use celblock::{
    Delivery, FlexPolicy, GridConfig, LayoutMetrics, LayoutNode, LayoutRoot, ListenerToken, Logger,
    ObservedGrid, Result, RootId, SharedWidth, ViewportHost, ViewportWatcher,
};

#[derive(Default)]
struct BenchHost;

impl ViewportHost for BenchHost {
    fn add_resize_listener(&mut self, root: RootId) -> ListenerToken {
        ListenerToken(root.get())
    }

    fn remove_resize_listener(&mut self, _token: ListenerToken) {}
}

fn config() -> GridConfig {
    GridConfig::default()
        .with_cell_width(80.0)
        .with_gutter_width(20.0)
        .with_breakpoints([5, 10, 15])
        .with_flexible(FlexPolicy::always())
}

fn build_tree(columns: usize) -> Result<LayoutNode> {
    let mut row = LayoutNode::row("bench");
    for idx in 0..columns {
        let nested = LayoutNode::row(format!("nested-{idx}")).with_children([
            LayoutNode::column(format!("left-{idx}")).width("1/3")?,
            LayoutNode::column(format!("right-{idx}")).width("2/3")?,
        ]);
        row = row.child(
            LayoutNode::column(format!("col-{idx}"))
                .width("1/2")?
                .child(nested),
        );
    }
    Ok(row)
}

fn build_watcher(width: &SharedWidth) -> Result<ViewportWatcher<SharedWidth, BenchHost>> {
    let root = LayoutRoot::new(config())?
        .with_logger(Logger::new(NullSink))
        .with_metrics(Arc::new(Mutex::new(LayoutMetrics::new())));
    let mut watcher = ViewportWatcher::new(root, width.clone(), BenchHost);
    let tree = build_tree(32)?;
    watcher.root_mut().mount(&tree, None)?;
    for idx in 0..32 {
        let root = watcher.root_mut();
        let node = root.registry().lookup(&format!("right-{idx}"));
        root.bind(node, |_: &ObservedGrid| Delivery::Committed)?;
    }
    watcher.attach()?;
    Ok(watcher)
}

fn resolve_sweep(c: &mut Criterion) {
    let root = LayoutRoot::new(config()).expect("root");
    c.bench_function("resolve_sweep", |b| {
        b.iter(|| {
            for width in (0..2000).step_by(7) {
                black_box(root.resolve(Some(black_box(width as f64))));
            }
        });
    });
}

fn watcher_resize_script(c: &mut Criterion) {
    let widths: Vec<f64> = (0..400).map(|step| 300.0 + (step % 40) as f64 * 37.5).collect();
    c.bench_function("watcher_resize_script", |b| {
        b.iter(|| {
            let width = SharedWidth::new(Some(1280.0));
            let mut watcher = build_watcher(&width).expect("watcher");
            for next in &widths {
                width.set(*next);
                black_box(watcher.notify().expect("attached"));
            }
        });
    });
}

criterion_group!(benches, resolve_sweep, watcher_resize_script);
criterion_main!(benches);
