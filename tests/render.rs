use image::Rgba;
use marcher::config::Resolution;
use marcher::math::{v, O};
use marcher::{
    App, Camera, Control, Key, KeyState, MarchConfig, RenderTarget, Scene, Settings, Sphere,
};
use std::time::Duration;

fn unit_sphere() -> Scene {
    Scene::new(vec![Sphere::new(O, 1.).unwrap()])
}

fn grey(p: Rgba<u8>) -> Option<u8> {
    let Rgba([r, g, b, a]) = p;
    (r == g && g == b && a == 255 && r > 0).then_some(r)
}

#[test_log::test]
fn camera_looking_at_sphere_hits_every_pixel() {
    let camera = Camera::new(v(0., 0., 20.), v(0., 0., -1.), 90.).unwrap();
    let mut target = RenderTarget::new(2, 1).unwrap();
    target.each(&unit_sphere(), &camera, &MarchConfig::default());

    let left = grey(target.pixel(0, 0)).expect("left pixel should hit");
    let right = grey(target.pixel(1, 0)).expect("right pixel should hit");
    assert_eq!(left, right);
    assert!(left < 255);
}

#[test_log::test]
fn center_is_brighter_than_edges() {
    let mut target = RenderTarget::new(4, 2).unwrap();
    target.each(&unit_sphere(), &Camera::default(), &MarchConfig::default());

    let center = grey(target.pixel(1, 0)).expect("center pixel should hit");
    for (x, y) in [(2, 0), (1, 1), (2, 1)] {
        assert_eq!(grey(target.pixel(x, y)), Some(center));
    }
    for (x, y) in [(0, 0), (3, 0), (0, 1), (3, 1)] {
        let Rgba([r, g, b, a]) = target.pixel(x, y);
        assert_eq!((g, b, a), (0, 0, 255));
        assert!(r < center);
    }
}

#[test_log::test]
fn walking_forward_from_settings() {
    let settings = Settings::from_json(
        r#"{
            "window": { "width": 32, "height": 16 },
            "initial_target": { "width": 8, "height": 4 },
            "camera": { "position": [0, 0, 0] },
            "spheres": [{ "center": [0, 0, 0], "radius": 1 }]
        }"#,
    )
    .unwrap();
    let mut app = App::new(&settings).unwrap();
    let window = Resolution {
        width: 32,
        height: 16,
    };

    let forward: KeyState = [Key::Forward].into_iter().collect();
    assert!(app
        .frame(&forward, Duration::from_secs(1), window)
        .unwrap());
    assert_eq!(app.camera.position, app.camera.forward());
    // the one-second frame was too slow to grow the target
    assert_eq!(app.target().size(), settings.initial_target);

    app.request_render();
    let idle = KeyState::default();
    let mut frames = 0;
    while app.frame(&idle, Duration::from_millis(10), window).unwrap() {
        frames += 1;
        assert!(frames < 100);
    }
    assert_eq!(app.target().size(), window);

    let reset: KeyState = [Key::Reset].into_iter().collect();
    app.frame(&reset, Duration::from_millis(10), window).unwrap();
    assert_eq!(app.camera, Camera::default());
}

#[test_log::test]
fn runtime_controls_change_settings() {
    let settings = Settings::from_json(
        r#"{
            "window": { "width": 40, "height": 30 },
            "auto_scale": false,
            "spheres": [{ "center": [0, 0, 0], "radius": 1 }]
        }"#,
    )
    .unwrap();
    let mut app = App::new(&settings).unwrap();
    let window = Resolution {
        width: 40,
        height: 30,
    };
    let idle = KeyState::default();
    let fast = Duration::from_millis(10);
    assert!(app.frame(&idle, fast, window).unwrap());
    assert!(!app.scene_updated());

    app.apply(Control::ToggleAutoScale, window).unwrap();
    assert!(app.auto_scale().enabled);
    assert!(app.scene_updated());
    app.apply(Control::ToggleAutoScale, window).unwrap();
    assert!(!app.auto_scale().enabled);
    app.frame(&idle, fast, window).unwrap();

    app.apply(Control::MoreSteps, window).unwrap();
    assert_eq!(app.march_config().max_ray_step(), 110);
    assert!(app.scene_updated());
    app.apply(Control::FewerSteps, window).unwrap();
    app.apply(Control::FewerSteps, window).unwrap();
    assert_eq!(app.march_config().max_ray_step(), 90);
    app.set_march_config(MarchConfig::new(5, 1e-6).unwrap());
    app.apply(Control::FewerSteps, window).unwrap();
    assert_eq!(app.march_config().max_ray_step(), 1);

    app.apply(Control::GrowTarget, window).unwrap();
    assert_eq!(
        app.target().size(),
        Resolution {
            width: 12,
            height: 12
        }
    );
    for _ in 0..30 {
        app.apply(Control::GrowTarget, window).unwrap();
    }
    assert_eq!(app.target().size(), window);
    app.apply(Control::ShrinkTarget, window).unwrap();
    assert_eq!(
        app.target().size(),
        Resolution {
            width: 35,
            height: 26
        }
    );
    assert!(app.frame(&idle, fast, window).unwrap());
    assert_eq!(app.target().width(), 35);

    assert!(!app.scene_updated());
    app.apply(Control::Rerender, window).unwrap();
    assert!(app.scene_updated());

    // with auto-scale off a camera edit keeps the chosen size
    app.set_camera_position(v(0., 0., 30.)).unwrap();
    assert_eq!(app.camera.position, v(0., 0., 30.));
    assert_eq!(app.target().width(), 35);
}
