

use std::path::{Path, PathBuf};
use std::io::BufWriter;
use std::fs::File;

use crate::prelude::*;


#[derive(Clone, Debug)]
pub struct ImageData {
    // WARNING: Currently width and height is assumed to represent number of pixels
    pixel_colors : Vec<Vector3>, // Vector of RGB per pixel, each channel in [0, 255]
    width : usize,
    height: usize,
    name: String,
}


impl ImageData {

    pub fn new(width: usize, height: usize, name: String, pixel_colors: Vec<Vector3>) -> Self {
        debug_assert_eq!(pixel_colors.len(), width * height);
        ImageData {
            pixel_colors,
            width,
            height,
            name,
        }
    }

    pub fn new_from_colors(resolution: [usize; 2], name: String, colors: Vec<Vector3>) -> Self {
        let (width, height) = (resolution[0], resolution[1]);
        Self::new(width, height, name, colors)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pixel(&self, col: usize, row: usize) -> Vector3 {
        self.pixel_colors[row * self.width + col]
    }

    pub fn flatten_color(&self) -> Vec<Float> {
        // Return [R1, G1, B1, R2, G2, B2, ...] vector
        // where each triplet is RGB color of a pixel.
        self.pixel_colors.iter().flat_map(|v| [v.x, v.y, v.z]).collect()
    }

    /// Clamp colors and return a flattened array of R G B values per pixel
    pub fn to_rgb(&self) -> Vec<u8> {
        self.flatten_color().into_iter().map(|x| x.clamp(0.0, 255.0) as u8).collect()
    }

    pub fn check_extension(&self, path: &Path, extension: &str) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some(extension)
    }

    pub fn get_png_fullpath(&self, path: &str) -> PathBuf {
        // Check if provided path is a folder
        // if so, create a .png under this folder
        // otherwise use the provided path as is
        let extension = "png";
        let path = Path::new(path);
        let mut finalpath: PathBuf = path.to_path_buf();
        if path.is_dir() {
            // create <imagename>.png under this directory
            finalpath = path.join(&self.name);
        }

        if !self.check_extension(&finalpath, extension){
            finalpath.set_extension(extension);
            warn!(">> Extension changed to .{}, final path is {}", extension, finalpath.display());
        }
        finalpath
    }

    pub fn save_png(&self, path: &str) -> Result<PathBuf, Box<dyn std::error::Error>>{
        // Path is either a folder name or
        // full path including <imagename>.png
        // If full path is not provided it will use
        // stored image name.
        //
        // DISCLAIMER: This function is based on https://docs.rs/png/0.18.0/png/
        let path: PathBuf = self.get_png_fullpath(path);

        let file = File::create(&path)?;
        let w = BufWriter::new(file);
        let mut encoder = png::Encoder::new(w, self.width as u32, self.height as u32);

        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;

        let data = self.to_rgb();
        writer.write_image_data(&data)?; // Save
        info!("Image saved to {}", path.display());
        Ok(path)
    }
}
