use approx::assert_relative_eq;
use glam::{Mat4, Vec3};
use sphere_scene::{
    camera::{Camera, CameraMovement, DEFAULT_POSITION},
    frame::FrameContext,
};

#[test]
fn test_camera_creation() {
    let camera = Camera::default();
    assert_eq!(camera.position(), DEFAULT_POSITION);
    assert_eq!(camera.zoom(), 45.0);

    let view_proj = camera.view_projection_matrix(800.0 / 600.0);
    assert_ne!(view_proj, Mat4::IDENTITY);
    assert!(view_proj.to_cols_array().iter().all(|v| v.is_finite()));
}

#[test]
fn test_scene_origin_is_in_front_of_default_camera() {
    let camera = Camera::default();
    let clip = camera.view_projection_matrix(1.0) * Vec3::new(0.0, 50.0, 0.0).extend(1.0);
    let ndc = clip.truncate() / clip.w;

    assert!(clip.w > 0.0, "point should be in front of the camera");
    assert!(
        ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4,
        "point straight ahead maps to the centre"
    );
}

#[test]
fn test_keyboard_moves_along_view_direction() {
    let mut camera = Camera::new(Vec3::ZERO);

    camera.process_keyboard(CameraMovement::Forward, 0.5);
    assert_relative_eq!(camera.position().z, -10.0, epsilon = 1e-4);

    camera.process_keyboard(CameraMovement::Right, 0.25);
    assert_relative_eq!(camera.position().x, 5.0, epsilon = 1e-4);

    camera.process_keyboard(CameraMovement::Backward, 0.5);
    camera.process_keyboard(CameraMovement::Left, 0.25);
    assert!(camera.position().length() < 1e-4);
}

#[test]
fn test_mouse_look_turns_the_camera() {
    let mut camera = Camera::new(Vec3::ZERO).with_mouse_sensitivity(1.0);

    camera.process_mouse_movement(90.0, 0.0);
    assert_relative_eq!(camera.yaw(), 0.0);
    assert!((camera.front() - Vec3::X).length() < 1e-5);
}

#[test]
fn test_scroll_zoom_is_clamped() {
    let mut camera = Camera::default();

    camera.process_mouse_scroll(10.0);
    assert_eq!(camera.zoom(), 35.0);

    camera.process_mouse_scroll(100.0);
    assert_eq!(camera.zoom(), 1.0);

    camera.process_mouse_scroll(-100.0);
    assert_eq!(camera.zoom(), 45.0);
}

#[test]
fn test_apply_input_from_frame_context() {
    let mut camera = Camera::new(Vec3::ZERO).with_movement_speed(4.0);
    let mut ctx = FrameContext::new();
    ctx.advance(0.0);
    ctx.advance(0.5);
    ctx.input.set_held(CameraMovement::Forward, true);
    ctx.input.scrolled(5.0);

    camera.apply_input(&ctx);

    assert_relative_eq!(camera.position().z, -2.0, epsilon = 1e-5);
    assert_eq!(camera.zoom(), 40.0);
}

#[test]
fn test_aspect_ratio_changes_projection() {
    let camera = Camera::default();
    assert_ne!(
        camera.view_projection_matrix(1.0),
        camera.view_projection_matrix(16.0 / 9.0)
    );
    assert_eq!(
        camera.view_projection_matrix_cols(1.0),
        camera.view_projection_matrix(1.0).to_cols_array_2d()
    );
}
