use plot_sync::{
    Screen, SyncError, Update,
    data_structures::geometry::AttributeRate,
};

use crate::common::test_utils::{instanced_plot_desc, plot_desc, scene, scene_desc, session};

mod common;

fn attribute(plot: &str, name: &str, values: Vec<f32>, length: usize) -> Update {
    Update::Attribute {
        plot: plot.to_string(),
        name: name.to_string(),
        values,
        length,
    }
}

#[test]
fn in_capacity_updates_write_in_place() {
    let mut session = session();
    session
        .deserialize_scene(&scene(scene_desc("s", vec![plot_desc("p", "data")], vec![])), Screen::default())
        .unwrap();
    let handle = session.find_plot("p").unwrap().geometry.handle();

    session
        .apply(attribute("p", "position", vec![9.0, 9.0, 9.0, 8.0, 8.0, 8.0], 2))
        .unwrap();

    let plot = session.find_plot("p").unwrap();
    assert_eq!(plot.attributes().rebuilds(), 0);
    assert_eq!(plot.geometry.handle(), handle);
    let position = plot.geometry.attribute("position").unwrap();
    assert_eq!(&position.array[..6], &[9.0, 9.0, 9.0, 8.0, 8.0, 8.0]);
    assert_eq!(position.array.len(), 9);
    assert!(position.needs_update());
    assert_eq!(plot.attributes().count(AttributeRate::Vertex), 3);
}

#[test]
fn growth_waits_for_every_vertex_buffer() {
    let mut session = session();
    session
        .deserialize_scene(&scene(scene_desc("s", vec![plot_desc("p", "data")], vec![])), Screen::default())
        .unwrap();
    let handle = session.find_plot("p").unwrap().geometry.handle();

    session.apply(attribute("p", "position", vec![1.0; 15], 5)).unwrap();

    let plot = session.find_plot("p").unwrap();
    assert_eq!(plot.attributes().rebuilds(), 0);
    assert_eq!(plot.geometry.handle(), handle);
    assert_eq!(plot.geometry.attribute("position").unwrap().count(), 3);
    assert_eq!(plot.geometry.attribute("position").unwrap().pending_count(), Some(5));
    assert_eq!(plot.attributes().pending_growth(AttributeRate::Vertex), Some(5));

    session.apply(attribute("p", "uv", vec![2.0; 10], 5)).unwrap();

    let plot = session.find_plot("p").unwrap();
    assert_eq!(plot.attributes().rebuilds(), 1);
    assert_ne!(plot.geometry.handle(), handle);
    assert_eq!(plot.geometry.attribute("position").unwrap().count(), 5);
    assert_eq!(plot.geometry.attribute("uv").unwrap().count(), 5);
    assert_eq!(plot.geometry.attribute("uv").unwrap().array, vec![2.0; 10]);
    assert_eq!(plot.geometry.index, vec![0, 1, 2]);
    assert_eq!(plot.attributes().pending_growth(AttributeRate::Vertex), None);

    let backend = session.backend();
    assert_eq!(backend.live_geometries(), 1);
    assert_eq!(backend.stats().geometries_released, 1);
    let record = backend.geometry(plot.geometry.handle().unwrap()).unwrap();
    assert_eq!(record.attributes["position"], 5);
    assert_eq!(record.attributes["uv"], 5);
}

#[test]
fn in_place_writes_supersede_staged_growth() {
    let mut session = session();
    session
        .deserialize_scene(&scene(scene_desc("s", vec![plot_desc("p", "data")], vec![])), Screen::default())
        .unwrap();

    session.apply(attribute("p", "position", vec![1.0; 15], 5)).unwrap();
    session.apply(attribute("p", "position", vec![7.0; 9], 3)).unwrap();

    let plot = session.find_plot("p").unwrap();
    assert_eq!(plot.attributes().pending_growth(AttributeRate::Vertex), None);
    assert_eq!(plot.geometry.attribute("position").unwrap().pending_count(), None);

    session.apply(attribute("p", "uv", vec![2.0; 10], 5)).unwrap();

    let plot = session.find_plot("p").unwrap();
    assert_eq!(plot.attributes().rebuilds(), 0);
    assert_eq!(plot.attributes().pending_growth(AttributeRate::Vertex), Some(5));
    assert_eq!(plot.geometry.attribute("position").unwrap().array, vec![7.0; 9]);
    assert_eq!(plot.geometry.attribute("uv").unwrap().pending_count(), Some(5));
}

#[test]
fn disagreeing_lengths_keep_the_last_consistent_geometry() {
    let mut session = session();
    session
        .deserialize_scene(&scene(scene_desc("s", vec![plot_desc("p", "data")], vec![])), Screen::default())
        .unwrap();

    session.apply(attribute("p", "position", vec![1.0; 15], 5)).unwrap();
    session.apply(attribute("p", "uv", vec![1.0; 12], 6)).unwrap();

    let plot = session.find_plot("p").unwrap();
    assert_eq!(plot.attributes().rebuilds(), 0);
    assert_eq!(plot.geometry.attribute("uv").unwrap().count(), 3);
    assert_eq!(plot.attributes().pending_growth(AttributeRate::Vertex), Some(6));

    session.apply(attribute("p", "position", vec![1.0; 18], 6)).unwrap();
    let plot = session.find_plot("p").unwrap();
    assert_eq!(plot.attributes().rebuilds(), 1);
    assert_eq!(plot.attributes().count(AttributeRate::Vertex), 6);
}

#[test]
fn instance_count_follows_updates() {
    let mut session = session();
    session
        .deserialize_scene(&scene(scene_desc("s", vec![instanced_plot_desc("i")], vec![])), Screen::default())
        .unwrap();
    assert_eq!(session.find_plot("i").unwrap().instance_count(), Some(2));

    session.apply(attribute("i", "offset", vec![5.0, 5.0, 5.0], 1)).unwrap();
    let plot = session.find_plot("i").unwrap();
    assert_eq!(plot.instance_count(), Some(1));
    assert_eq!(plot.attributes().rebuilds(), 0);

    session.apply(attribute("i", "offset", vec![0.5; 12], 4)).unwrap();
    assert_eq!(session.find_plot("i").unwrap().instance_count(), Some(1));
    session.apply(attribute("i", "rotation", vec![0.25; 16], 4)).unwrap();

    let plot = session.find_plot("i").unwrap();
    assert_eq!(plot.instance_count(), Some(4));
    assert_eq!(plot.attributes().rebuilds(), 1);
    assert_eq!(plot.attributes().count(AttributeRate::Instance), 4);
    // The vertex set is independent of the instance set.
    assert_eq!(plot.attributes().count(AttributeRate::Vertex), 1);
    assert_eq!(plot.geometry.attribute("position").unwrap().array, vec![0.0, 0.0]);
}

#[test]
fn rejected_attribute_updates_leave_the_plot_alone() {
    let mut session = session();
    session
        .deserialize_scene(&scene(scene_desc("s", vec![plot_desc("p", "data")], vec![])), Screen::default())
        .unwrap();

    assert!(matches!(
        session.apply(attribute("p", "normal", vec![0.0; 3], 1)),
        Err(SyncError::UnknownAttribute { .. })
    ));
    assert!(matches!(
        session.apply(attribute("p", "uv", vec![0.0; 8], 3)),
        Err(SyncError::AttributeOverflow { .. })
    ));
    // Updates for plots that are gone are dropped.
    session.apply(attribute("gone", "position", vec![0.0; 3], 1)).unwrap();

    let plot = session.find_plot("p").unwrap();
    assert!(!plot.geometry.attribute("uv").unwrap().needs_update());
    assert_eq!(plot.attributes().rebuilds(), 0);
}

#[test]
fn flush_uploads_dirty_buffers_once() {
    let mut session = session();
    session
        .deserialize_scene(&scene(scene_desc("s", vec![plot_desc("p", "data")], vec![])), Screen::default())
        .unwrap();

    session.apply(attribute("p", "uv", vec![1.0, 1.0], 1)).unwrap();
    session
        .apply(Update::Faces {
            plot: "p".to_string(),
            faces: vec![2, 1, 0, 0, 1, 2],
        })
        .unwrap();
    session.flush();

    let stats = session.backend().stats();
    assert_eq!(stats.attribute_writes, 1);
    assert_eq!(stats.index_writes, 1);
    let plot = session.find_plot("p").unwrap();
    assert!(!plot.geometry.attribute("uv").unwrap().needs_update());
    let record = session.backend().geometry(plot.geometry.handle().unwrap()).unwrap();
    assert_eq!(record.index_len, 6);

    session.flush();
    assert_eq!(session.backend().stats().attribute_writes, 1);
}
