use plot_sync::Screen;
use serde_json::json;

use crate::common::test_utils::{plot_desc, sampler, scene, scene_desc, session};

mod common;

/// `root` holds `a`; its child `left` holds `b` and `c`, its child `right`
/// holds `d` and has a child `deep` holding `e`.
fn tree() -> plot_sync::SceneDesc {
    let deep = scene_desc("deep", vec![plot_desc("e", "data")], vec![]);
    let left = scene_desc("left", vec![plot_desc("b", "data"), plot_desc("c", "pixel")], vec![]);
    let right = scene_desc("right", vec![plot_desc("d", "relative")], vec![deep]);
    scene(scene_desc("root", vec![plot_desc("a", "data")], vec![left, right]))
}

#[test]
fn deleting_the_root_tree_releases_everything() {
    let mut session = session();
    session.deserialize_scene(&tree(), Screen::default()).unwrap();
    assert_eq!(session.registry().scene_count(), 4);
    assert_eq!(session.registry().plot_count(), 5);
    assert_eq!(session.backend().live(), 10);

    assert!(session.delete_three_scene("root"));

    assert!(session.registry().is_empty());
    let backend = session.backend();
    assert_eq!(backend.live(), 0);
    let stats = backend.stats();
    assert_eq!(stats.geometries_released, 5);
    assert_eq!(stats.materials_released, 5);
    assert_eq!(stats.invalid_releases, 0);
}

#[test]
fn deleting_a_subtree_keeps_the_rest() {
    let mut session = session();
    session.deserialize_scene(&tree(), Screen::default()).unwrap();

    assert!(session.delete_three_scene("right"));

    assert!(session.find_scene("right").is_none());
    assert!(session.find_scene("deep").is_none());
    assert!(session.find_plot("d").is_none());
    assert!(session.find_plot("e").is_none());
    assert_eq!(session.find_scene("root").unwrap().children(), ["left".to_string()]);
    assert_eq!(session.registry().plot_count(), 3);
    assert_eq!(session.backend().live(), 6);
    assert_eq!(session.backend().stats().invalid_releases, 0);
}

#[test]
fn delete_scene_orphans_its_children() {
    let mut session = session();
    session.deserialize_scene(&tree(), Screen::default()).unwrap();

    assert!(session.delete_scene("right"));

    assert!(session.find_plot("d").is_none());
    let deep = session.find_scene("deep").unwrap();
    assert_eq!(deep.parent(), None);
    assert!(session.find_plot("e").is_some());
    assert_eq!(
        session.registry().root_scenes(),
        vec!["deep".to_string(), "root".to_string()]
    );
}

#[test]
fn delete_plots_only_touches_plots_of_the_scene() {
    let mut session = session();
    session.deserialize_scene(&tree(), Screen::default()).unwrap();

    session.delete_plots("left", &["b", "d", "missing"]);

    assert!(session.find_plot("b").is_none());
    assert!(session.find_plot("d").is_some());
    assert_eq!(session.find_scene("left").unwrap().plots(), ["c".to_string()]);
    assert_eq!(session.backend().live(), 8);
}

#[test]
fn delete_scenes_removes_plots_then_trees() {
    let mut session = session();
    session.deserialize_scene(&tree(), Screen::default()).unwrap();

    session.delete_scenes(&["left", "deep", "nope"], &["a", "d", "nope"]);

    assert_eq!(session.registry().scene_count(), 2);
    assert!(session.find_scene("root").unwrap().plots().is_empty());
    assert!(session.find_scene("right").unwrap().plots().is_empty());
    assert!(session.find_scene("right").unwrap().children().is_empty());
    assert_eq!(session.registry().plot_count(), 0);
    assert_eq!(session.backend().live(), 0);
    assert_eq!(session.backend().stats().invalid_releases, 0);
}

#[test]
fn missing_ids_are_no_ops() {
    let mut session = session();
    session.deserialize_scene(&tree(), Screen::default()).unwrap();

    assert!(!session.delete_plot("nope"));
    assert!(!session.delete_scene("nope"));
    assert!(!session.delete_three_scene("nope"));
    session.delete_plots("nope", &["a"]);

    assert!(session.find_plot("a").is_some());
    assert_eq!(session.backend().live(), 10);

    // Deleting twice releases once.
    assert!(session.delete_plot("a"));
    assert!(!session.delete_plot("a"));
    assert_eq!(session.backend().stats().geometries_released, 1);
    assert_eq!(session.backend().stats().invalid_releases, 0);
}

#[test]
fn plot_textures_are_released() {
    let mut session = session();
    let mut desc = plot_desc("img", "data");
    desc["uniforms"]["image"] = sampler("RGBAFormat", json!([2, 1]), json!(vec![0.0; 8]));
    desc["uniforms"]["colormap"] = sampler("RedFormat", json!([4]), json!([0.0, 0.25, 0.5, 1.0]));
    session
        .deserialize_scene(&scene(scene_desc("s", vec![desc], vec![])), Screen::default())
        .unwrap();
    assert_eq!(session.backend().live_textures(), 2);

    assert!(session.delete_plot("img"));

    let backend = session.backend();
    assert_eq!(backend.live_textures(), 0);
    assert_eq!(backend.stats().textures_released, 2);
    assert_eq!(backend.live(), 0);
}

#[test]
fn rebuilding_a_scene_replaces_the_old_tree() {
    let mut session = session();
    session.deserialize_scene(&tree(), Screen::default()).unwrap();
    session.deserialize_scene(&tree(), Screen::default()).unwrap();

    assert_eq!(session.registry().scene_count(), 4);
    assert_eq!(session.registry().plot_count(), 5);
    assert_eq!(session.backend().live(), 10);
    assert_eq!(session.backend().stats().invalid_releases, 0);
}
