pub mod body;
pub mod camera;
pub mod collision;
pub mod frame;
pub mod frame_loop;
pub mod params;
pub mod scene;
pub mod stepper;
pub mod trace;
