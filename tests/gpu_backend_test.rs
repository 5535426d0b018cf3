#[cfg(feature = "integration-tests")]
use crate::common::test_utils::{init, plot_desc, sampler, scene, scene_desc};
#[cfg(feature = "integration-tests")]
mod common;

#[test]
#[cfg(feature = "integration-tests")]
fn uploads_follow_geometry_growth_and_teardown() {
    use plot_sync::{
        Screen, Session, SessionConfig, Update, resources::gpu::WgpuBackend,
    };
    use serde_json::json;

    init();
    let backend = futures::executor::block_on(WgpuBackend::new_headless())
        .expect("a headless adapter");
    let mut session = Session::new(backend, SessionConfig::default());

    let mut desc = plot_desc("p", "data");
    desc["uniforms"]["image"] = sampler("RGBFormat", json!([2, 1]), json!(vec![0.5; 6]));
    session
        .deserialize_scene(&scene(scene_desc("s", vec![desc], vec![])), Screen::default())
        .unwrap();

    let plot = session.find_plot("p").unwrap();
    let geometry = session.backend().geometry(plot.geometry.handle().unwrap()).unwrap();
    assert_eq!(geometry.num_indices, 3);
    assert_eq!(geometry.attributes["position"].size(), 9 * 4);
    let image = plot.material.uniform("image").unwrap().borrow();
    let texture = session
        .backend()
        .texture(image.as_texture().and_then(|t| t.handle()).unwrap())
        .unwrap();
    assert_eq!(texture.format, wgpu::TextureFormat::Rgba32Float);
    drop(image);

    for (name, values) in [("position", vec![1.0; 15]), ("uv", vec![1.0; 10])] {
        session
            .apply(Update::Attribute {
                plot: "p".to_string(),
                name: name.to_string(),
                values,
                length: 5,
            })
            .unwrap();
    }
    session.flush();

    let plot = session.find_plot("p").unwrap();
    let geometry = session.backend().geometry(plot.geometry.handle().unwrap()).unwrap();
    assert_eq!(geometry.attributes["position"].size(), 15 * 4);
    assert_eq!(geometry.attributes["uv"].size(), 10 * 4);

    assert!(session.delete_three_scene("s"));
    assert!(session.registry().is_empty());
}
