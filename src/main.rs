/*

    Build a BVH over a million spheres packed in a cube
    and ray trace it, one BVH query per pixel.

    Usage: cube_of_spheres [scene.json]
    Without arguments the default scene is rendered.

    @date: Oct, 2025
    @author: Bartu

*/

use std::{env, time::Instant};
use tracing::{info, warn, error, debug};

use fury_bvh::{BVH, camera::Camera, json_parser::parse_scene_config, renderer, scene};
use fury_bvh::scene::SceneConfig;
use fury_bvh::shapes::SphereBoxConverter;

fn main()  -> Result<(), Box<dyn std::error::Error>> {

    // Logging on console
    tracing_subscriber::fmt::init();

    // Parse args
    let args: Vec<String> = env::args().collect();
    let config: SceneConfig = if args.len() == 1 {
        warn!("No arguments were provided, using the default scene...");
        SceneConfig::default()
    } else if args.len() == 2 {
        info!("Loading scene from {}...", args[1]);
        parse_scene_config(&args[1]).map_err(|e| {
            error!("Failed to load scene: {}", e);
            e
        })?
    } else {
        error!("Usage: {} [<filename>.json]", args[0]);
        std::process::exit(1);
    };
    debug!("Scene config: {:#?}", config);

    // Create spheres packed in the space of a cube
    info!("Constructing {} spheres...", config.sphere_count);
    let spheres = scene::generate_spheres(&config);

    // Compute a BVH for this object set
    let start = Instant::now();
    let bvh = BVH::from_primitives(spheres, &SphereBoxConverter, &config.bvh);
    let construction_time = start.elapsed();

    // Output tree build time and statistics
    let stats = bvh.stats();
    info!("Built BVH ({} nodes, with {} leafs) in {:.02} ms",
          stats.node_count,
          stats.leaf_count,
          construction_time.as_secs_f64() * 1000.0);
    debug!("BVH stats: {:?}", stats);

    // Render image, one traversal per pixel
    let cam = Camera::from_config(&config);
    let im = renderer::render(&bvh, &cam, &config.image_name);

    if config.validation_rays > 0 {
        renderer::validate(&bvh, config.validation_rays, config.half_extent, config.seed);
    }

    // Write image to .png file
    info!("Writing out image file: \"{}\"", config.image_name);
    if let Err(e) = im.save_png(&config.image_name) {
        error!("Failed to save {}: {}", config.image_name, e);
        return Err(e);
    }
    info!("Finished execution.");
    Ok(())
}
