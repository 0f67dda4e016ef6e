//! Simulation configuration: which phones exist, where they start, how far
//! one movement step displaces them, and the RNG seed for reproducible
//! random placement. Shares the yaml file with `RaTreeBuilder`.
//!
//! ```yaml
//! ---
//! side_length: 220
//! move_step: 15
//! rng_seed: 7
//! phones:
//!   - id: a
//!     x: 250
//!     y: 300
//!   - id: b
//! num_phones: 2
//! ```

use hexgrid::Point;
use log::debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use septa::phone::PhoneDirectory;
use septa::{RaTree, SeptaResult};
use std::fs::read_to_string;
use std::path::Path;
use yaml_rust::{Yaml, YamlLoader};

/// One configured phone; a phone without coordinates is placed randomly
/// inside the root hexagon.
#[derive(Debug, Clone)]
pub struct PhoneSpec {
    /// Unique phone id
    pub id: String,
    /// Fixed starting position, if any
    pub position: Option<Point>,
}

/// The simulation half of the config file.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Distance of one movement step; defaults to half a cell side.
    pub move_step: Option<f64>,
    /// Seed for placement; the host's entropy when absent.
    pub rng_seed: Option<u64>,
    /// Number of randomly placed phones when no explicit list is given.
    pub num_phones: usize,
    /// Explicitly configured phones.
    pub phones: Vec<PhoneSpec>,
}

impl Default for SimConfig {
    fn default() -> SimConfig {
        SimConfig {
            move_step: None,
            rng_seed: None,
            num_phones: 2,
            phones: Vec::new(),
        }
    }
}

fn yaml_f64(value: &Yaml) -> Option<f64> {
    value.as_f64().or_else(|| value.as_i64().map(|i| i as f64))
}

impl SimConfig {
    /// Reads the simulation section of a yaml config file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> SimConfig {
        let config = read_to_string(&path).expect("Unable to read config file");
        let params_files = YamlLoader::load_from_str(&config).unwrap();
        SimConfig::from_yaml_doc(&params_files[0])
    }

    pub(crate) fn from_yaml_doc(params: &Yaml) -> SimConfig {
        let mut phones = Vec::new();
        if let Some(entries) = params["phones"].as_vec() {
            for entry in entries {
                let id = match entry["id"].as_str() {
                    Some(id) => id.to_string(),
                    None => continue,
                };
                let position = match (yaml_f64(&entry["x"]), yaml_f64(&entry["y"])) {
                    (Some(x), Some(y)) => Some(Point::new(x, y)),
                    _ => None,
                };
                phones.push(PhoneSpec { id, position });
            }
        }
        SimConfig {
            move_step: yaml_f64(&params["move_step"]),
            rng_seed: params["rng_seed"].as_i64().map(|i| i as u64),
            num_phones: params["num_phones"].as_i64().unwrap_or(2) as usize,
            phones,
        }
    }

    /// The configured step, or half a leaf-cell side so a single step can
    /// cross at most one boundary.
    pub fn resolve_move_step(&self, tree: &RaTree) -> f64 {
        self.move_step.unwrap_or_else(|| {
            let levels = tree.parameters().levels;
            let leaf_side =
                tree.parameters().side_length / 7f64.sqrt().powi(levels as i32 - 1);
            leaf_side / 2.0
        })
    }

    /// Adds every configured phone to the directory and registers the ones
    /// that start in coverage. Unplaced phones are dropped at a random spot
    /// inside the root hexagon; with a seed the placement is deterministic,
    /// one rng per phone seeded with `rng_seed ^ index`.
    pub fn populate(
        &self,
        tree: &mut RaTree,
        phones: &mut PhoneDirectory,
    ) -> SeptaResult<()> {
        let mut specs = self.phones.clone();
        if specs.is_empty() {
            for i in 0..self.num_phones {
                specs.push(PhoneSpec {
                    id: format!("phone-{}", i),
                    position: None,
                });
            }
        }
        for (i, spec) in specs.iter().enumerate() {
            let position = match spec.position {
                Some(position) => position,
                None => {
                    let mut rng = match self.rng_seed {
                        Some(seed) => SmallRng::seed_from_u64(seed ^ i as u64),
                        None => SmallRng::from_entropy(),
                    };
                    random_position(tree, &mut rng)
                }
            };
            let p = phones.add(&spec.id, position)?;
            tree.update_location(phones, p)?;
            debug!(
                "placed phone {} at ({:.2}, {:.2}), cell {:?}",
                spec.id,
                position.x,
                position.y,
                phones.phone(p).pcs_cell()
            );
        }
        Ok(())
    }
}

/// Rejection-samples a point inside the root hexagon. The bounding box is
/// hit more often than not, so a few tries suffice; the root center is the
/// (never expected) fallback.
fn random_position(tree: &RaTree, rng: &mut SmallRng) -> Point {
    let center = tree.parameters().center;
    let side = tree.parameters().side_length;
    let root = tree.root_address();
    for _ in 0..1000 {
        let candidate = Point::new(
            center.x + rng.gen_range(-side..side),
            center.y + rng.gen_range(-side..side),
        );
        let inside = tree
            .get_node_and(root, |n| n.hexagon().contains(candidate))
            .unwrap_or(false);
        if inside {
            return candidate;
        }
    }
    center
}
