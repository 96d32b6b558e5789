/*

    Provide utilities to parse the demo's JSON scene description.

    The parser is somewhat robust, let <a> be integer or float type,
    in JSON file <a> can be given both in quotes (string) or as is.

    e.g. In JSON file both
    "SphereCount": "1000" and "SphereCount": 1000
    works as sphere_count: usize in source code

    Vector3 fields accept both "<a> <a> <a>" and [<a>, <a>, <a>].

    @date: 2 Oct, 2025
    @author: bartu
*/

use std::fmt::{self};
use std::fs::File;
use std::io::BufReader;

use serde::{Deserialize, Deserializer};
use serde::de::{self, Visitor, SeqAccess};

use crate::prelude::*;
use crate::scene::SceneConfig;

pub fn parse_scene_config(path: &str) -> Result<SceneConfig, Box<dyn std::error::Error>> {

    let span = tracing::span!(tracing::Level::INFO, "load_scene");
    let _enter = span.enter();

    // Open file
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    debug!("Reading file from {}", path);

    // Parse JSON into SceneConfig
    let config: SceneConfig = serde_json::from_reader(reader)?;
    config.validate()?;
    Ok(config)
}

pub(crate) fn deser_usize<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    /*
        Deserialize usize type given as either string or number in JSON
    */
    let s: serde_json::Value = Deserialize::deserialize(deserializer)?;
    match s {
        serde_json::Value::Number(n) => n.as_u64()
            .map(|v| v as usize)
            .ok_or_else(|| de::Error::custom("Invalid unsigned integer")),
        serde_json::Value::String(s) => s.trim().parse::<usize>()
            .map_err(|_| de::Error::custom("Failed to parse integer from string")),
        t => Err(de::Error::custom(format!("Expected int or string, found {t}"))),
    }
}

pub(crate) fn deser_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    deser_usize(deserializer).map(|v| v as u64)
}

// Handles floats as string or number
pub(crate) fn deser_float<'de, D>(deserializer: D) -> Result<Float, D::Error>
where
    D: Deserializer<'de>,
{
    let s: serde_json::Value = Deserialize::deserialize(deserializer)?;
    match s {
        serde_json::Value::Number(n) => n.as_f64()
            .map(|v| v as Float)
            .ok_or_else(|| de::Error::custom("Invalid float")),
        serde_json::Value::String(s) => s.trim().parse::<Float>()
            .map_err(|_| de::Error::custom("Failed to parse float from string")),
        t => Err(de::Error::custom(format!("Expected float or string, found {t}"))),
    }
}

pub(crate) fn deser_vec3<'de, D>(deserializer: D) -> Result<Vector3, D::Error>
where
    D: Deserializer<'de>,
{
    struct Vec3Visitor;

    impl<'de> Visitor<'de> for Vec3Visitor {
        type Value = Vector3;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a Vec3 as a string 'x y z' or an array [x, y, z]")
        }

        // Given "X Y Z"
        fn visit_str<E>(self, value: &str) -> Result<Vector3, E>
        where
            E: de::Error,
        {
            parse_vec3_str(value).map_err(de::Error::custom)
        }

        // Given [X, Y, Z]
        fn visit_seq<A>(self, mut seq: A) -> Result<Vector3, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut xyz = [0.0 as Float; 3];
            for v in xyz.iter_mut() {
                *v = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::custom("Expected 3 elements in Vec3 array"))?;
            }
            if seq.next_element::<Float>()?.is_some() {
                return Err(de::Error::custom("Expected only 3 elements in Vec3 array"));
            }
            Ok(Vector3::new(xyz[0], xyz[1], xyz[2]))
        }
    }

    deserializer.deserialize_any(Vec3Visitor)
}

pub(crate) fn deser_pair<'de, D>(deserializer: D) -> Result<[usize; 2], D::Error>
where
    D: Deserializer<'de>,
{
    /*
        Deserialize "<a> <b>" or [a, b], e.g. ImageResolution
    */
    let v: serde_json::Value = Deserialize::deserialize(deserializer)?;
    let parts: Vec<usize> = match v {
        serde_json::Value::String(s) => s
            .split_whitespace()
            .map(|p| p.parse::<usize>().map_err(de::Error::custom))
            .collect::<Result<_, D::Error>>()?,
        serde_json::Value::Array(values) => values
            .iter()
            .map(|p| p.as_u64().map(|v| v as usize).ok_or_else(|| de::Error::custom("Invalid pair element")))
            .collect::<Result<_, D::Error>>()?,
        t => return Err(de::Error::custom(format!("Expected pair as string or array, found {t}"))),
    };
    match parts.as_slice() {
        [a, b] => Ok([*a, *b]),
        _ => Err(de::Error::custom(format!("Expected 2 elements, found {}", parts.len()))),
    }
}

pub fn parse_vec3_str(s: &str) -> Result<Vector3, String> {
    let parts: Vec<&str> = s.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(format!("Expected 3 components for Vec3, got {} in '{}'", parts.len(), s));
    }
    let mut xyz = [0.0 as Float; 3];
    for (v, p) in xyz.iter_mut().zip(parts) {
        *v = p.parse::<Float>().map_err(|e| format!("Invalid component '{}': {}", p, e))?;
    }
    Ok(Vector3::new(xyz[0], xyz[1], xyz[2]))
}
