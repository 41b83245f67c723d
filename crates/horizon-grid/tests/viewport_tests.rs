//! Tests for viewport windowing and the row cache, wired to a data view.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde_json::json;

use horizon_grid::model::{DataView, Item, ItemId, Row};
use horizon_grid::options::{RowCacheOptions, ViewportOptions};
use horizon_grid::viewport::{
    InputSource, RenderScheduler, RowCache, RowSpan, ScrollDirection, ScrollInput, ViewportWindow,
};

type Json = serde_json::Value;

fn wheel(scroll_top: f64) -> ScrollInput {
    ScrollInput {
        source: InputSource::Wheel,
        scroll_top,
        container_height: 250.0,
    }
}

fn label(view: &DataView<Json>, row: usize) -> String {
    match view.get_item(row) {
        Some(Row::Item(item)) => format!("{}:{}", item.field("id"), item.field("name")),
        _ => String::new(),
    }
}

#[test]
fn test_scroll_scenario_visible_range() {
    let mut window = ViewportWindow::new(ViewportOptions::default()).expect("valid options");
    window.set_total_rows(1000);

    let range = window.on_scroll(wheel(500.0)).expect("first scroll renders");
    assert_eq!(range.visible, RowSpan::new(20, 30));
    assert_eq!(window.direction(), ScrollDirection::Down);
    // Scrolling down: full buffer below, minimum above.
    assert_eq!(range.render, Some(RowSpan::new(17, 40)));
}

#[test]
fn test_resize_always_renders() {
    let mut window = ViewportWindow::new(ViewportOptions::default()).unwrap();
    window.set_total_rows(100);
    window.on_scroll(wheel(0.0));
    assert!(window.on_scroll(wheel(1.0)).is_none());

    let resized = window.on_scroll(ScrollInput {
        source: InputSource::Resize,
        scroll_top: 1.0,
        container_height: 500.0,
    });
    assert_eq!(resized.map(|range| range.visible), Some(RowSpan::new(0, 20)));
}

#[test]
fn test_row_cache_follows_data_view() {
    let mut view: DataView<Json> = DataView::new();
    let mut window = ViewportWindow::new(ViewportOptions::default()).unwrap();
    let mut cache: RowCache<String> = RowCache::new(RowCacheOptions::default()).unwrap();

    let pending_rows = Arc::new(Mutex::new(Vec::new()));
    let pending = pending_rows.clone();
    view.signals()
        .rows_changed
        .connect(move |change| pending.lock().extend(change.rows.iter().copied()));
    let row_count = Arc::new(Mutex::new(None));
    let count = row_count.clone();
    view.signals()
        .row_count_changed
        .connect(move |change| *count.lock() = Some(change.current));

    view.set_items((0..100).map(|id| json!({"id": id, "name": format!("n{id}")})).collect())
        .unwrap();
    let total = row_count.lock().take().expect("row count announced");
    window.set_total_rows(total);
    pending_rows.lock().clear();

    let range = window.on_scroll(wheel(0.0)).unwrap();
    cache.render(&range, None, |row| label(&view, row));
    assert_eq!(cache.get(3).map(String::as_str), Some("3:n3"));

    // An edit invalidates the cached row; the next render rebuilds it.
    view.update_item(&ItemId::from(3), json!({"id": 3, "name": "edited"}))
        .unwrap();
    let dirty: Vec<usize> = pending_rows.lock().drain(..).collect();
    assert_eq!(dirty, vec![3]);
    assert_eq!(cache.invalidate_rows(&dirty).len(), 1);

    let range = window.render();
    cache.render(&range, None, |row| label(&view, row));
    assert_eq!(cache.get(3).map(String::as_str), Some("3:edited"));

    // Shrinking the view drops cached rows past the end.
    view.set_filter(|item, _| item.field("id").as_int().unwrap_or(0) < 5);
    let total = row_count.lock().take().expect("row count announced");
    cache.truncate(total);
    window.set_total_rows(total);
    assert!(cache.cached_rows().all(|row| row < 5));
}

#[test]
fn test_debounced_render_requests() {
    let options = ViewportOptions::from_json_str(r#"{"render_delay_ms": 20}"#).unwrap();
    let mut scheduler = RenderScheduler::from_options(&options);
    let start = Instant::now();

    for step in 0..5 {
        scheduler.request(start + Duration::from_millis(step * 5));
    }
    assert!(!scheduler.poll(start + Duration::from_millis(30)));
    assert!(scheduler.poll(start + Duration::from_millis(40)));
    assert!(!scheduler.is_pending());
}
