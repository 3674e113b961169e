//! Desktop entry point: parses the command line into a [`ViewerConfig`] and runs the viewer.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use clap::Parser;
    use point_grid_viewer::ViewerConfig;

    #[derive(Parser, Debug)]
    #[command(name = "points", about = "Fly through a dense grid of colored points")]
    pub struct Cli {
        /// Window title
        #[arg(long, default_value = "points")]
        pub title: String,

        /// Window width in pixels
        #[arg(long, default_value_t = 800)]
        pub width: u32,

        /// Window height in pixels
        #[arg(long, default_value_t = 600)]
        pub height: u32,

        /// Allow resizing the window
        #[arg(long)]
        pub resizable: bool,

        /// Points along each axis, overridden per axis by --grid-x/--grid-y/--grid-z
        #[arg(short, long, default_value_t = 256)]
        pub grid: u32,

        /// Points along X [default: --grid]
        #[arg(long)]
        pub grid_x: Option<u32>,

        /// Points along Y [default: --grid]
        #[arg(long)]
        pub grid_y: Option<u32>,

        /// Points along Z [default: --grid]
        #[arg(long)]
        pub grid_z: Option<u32>,

        /// Initial camera position as x,y,z [default: 0,0,4]
        #[arg(
            long,
            value_name = "X,Y,Z",
            value_parser = parse_position,
            allow_hyphen_values = true
        )]
        pub camera_position: Option<[f32; 3]>,

        /// Initial vertical field of view in degrees
        #[arg(long, default_value_t = 50.0)]
        pub fov: f32,

        /// Smallest field of view reachable by zooming in
        #[arg(long, default_value_t = 5.0)]
        pub min_fov: f32,

        /// Largest field of view reachable by zooming out
        #[arg(long, default_value_t = 130.0)]
        pub max_fov: f32,

        /// Near clip plane
        #[arg(long, default_value_t = 0.01)]
        pub near: f32,

        /// Far clip plane
        #[arg(long, default_value_t = 100.0)]
        pub far: f32,

        /// Movement speed in units per second
        #[arg(long, default_value_t = 2.0)]
        pub speed: f32,

        /// Speed factor while Shift is held
        #[arg(long, default_value_t = 5.0)]
        pub boost: f32,

        /// Mouse sensitivity in degrees per pixel
        #[arg(long, default_value_t = 0.1)]
        pub sensitivity: f32,

        /// Field of view change in degrees per wheel line; negative zooms in on scroll up
        #[arg(long, default_value_t = -0.2, allow_negative_numbers = true)]
        pub zoom_sensitivity: f32,

        /// Grid spin in degrees per second
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        pub spin: f32,

        /// Start with the overlay hidden
        #[arg(long)]
        pub no_hud: bool,

        /// Enable debug logging
        #[arg(short, long)]
        pub verbose: bool,
    }

    fn parse_position(value: &str) -> Result<[f32; 3], String> {
        let components = value
            .split(',')
            .map(|component| component.trim().parse::<f32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| format!("invalid coordinate in {value:?}: {err}"))?;
        match components.as_slice() {
            &[x, y, z] => Ok([x, y, z]),
            _ => Err(format!(
                "expected three comma-separated coordinates, got {}",
                components.len()
            )),
        }
    }

    impl Cli {
        pub fn into_config(self) -> ViewerConfig {
            let camera_position = self
                .camera_position
                .unwrap_or(ViewerConfig::default().camera_position);

            ViewerConfig {
                window_width: self.width,
                window_height: self.height,
                title: self.title,
                resizable: self.resizable,
                grid_width: self.grid_x.unwrap_or(self.grid),
                grid_height: self.grid_y.unwrap_or(self.grid),
                grid_depth: self.grid_z.unwrap_or(self.grid),
                camera_position,
                field_of_view: self.fov,
                near_plane: self.near,
                far_plane: self.far,
                move_speed: self.speed,
                boost_multiplier: self.boost,
                mouse_sensitivity: self.sensitivity,
                zoom_sensitivity: self.zoom_sensitivity,
                min_field_of_view: self.min_fov,
                max_field_of_view: self.max_fov,
                spin_degrees_per_second: self.spin,
                show_hud: !self.no_hud,
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn defaults_match_viewer_defaults() {
            let cli = Cli::parse_from(["points"]);
            assert_eq!(cli.into_config(), ViewerConfig::default());
        }

        #[test]
        fn per_axis_grid_overrides_uniform_size() {
            let cli = Cli::parse_from(["points", "--grid", "32", "--grid-y", "8", "--no-hud"]);
            let config = cli.into_config();
            assert_eq!(
                (config.grid_width, config.grid_height, config.grid_depth),
                (32, 8, 32)
            );
            assert!(!config.show_hud);
        }

        #[test]
        fn every_tunable_has_a_flag() {
            let cli = Cli::parse_from([
                "points",
                "--title",
                "grid",
                "--camera-position",
                "-1.5,2,30",
                "--boost",
                "3",
                "--zoom-sensitivity",
                "-0.5",
                "--min-fov",
                "10",
                "--max-fov",
                "170",
                "--fov",
                "150",
                "--spin",
                "-15",
            ]);
            let config = cli.into_config();
            assert_eq!(config.title, "grid");
            assert_eq!(config.camera_position, [-1.5, 2.0, 30.0]);
            assert_eq!(config.boost_multiplier, 3.0);
            assert_eq!(config.zoom_sensitivity, -0.5);
            assert_eq!(config.min_field_of_view, 10.0);
            assert_eq!(config.max_field_of_view, 170.0);
            assert_eq!(config.field_of_view, 150.0);
            assert_eq!(config.spin_degrees_per_second, -15.0);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn camera_position_needs_three_components() {
            assert!(Cli::try_parse_from(["points", "--camera-position", "1,2"]).is_err());
            assert!(Cli::try_parse_from(["points", "--camera-position", "1,2,z"]).is_err());
            assert_eq!(parse_position(" 0, -4 ,8"), Ok([0.0, -4.0, 8.0]));
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use anyhow::Context;
    use clap::Parser;

    let cli = cli::Cli::parse();

    let default_filter = if cli.verbose {
        "point_grid_viewer=debug,points=debug,wgpu_core=warn,info"
    } else {
        "point_grid_viewer=info,points=info,wgpu_core=warn,wgpu_hal=warn,warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = cli.into_config();
    log::debug!("{config:#?}");

    point_grid_viewer::run(config).context("point grid viewer failed")
}

#[cfg(target_arch = "wasm32")]
fn main() {}
