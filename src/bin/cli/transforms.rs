//! Building the transform list from command-line arguments.
//!
//! Transforms given with different flags are applied in the order they
//! appear on the command line, so `--delete x --preset orpheus` deletes
//! first. Transforms from `--transform-file` always run last.

use clap::ArgMatches;
use serde_json::Value as Json;
use std::path::Path;

use announcebulk::{KeyPath, Transform};

use crate::EditArgs;

/// Collects every transform requested on the command line, in order.
pub fn collect(args: &EditArgs, matches: &ArgMatches) -> Result<Vec<Transform>, String> {
    let mut ordered: Vec<(usize, Vec<Transform>)> = Vec::new();

    for (preset, index) in args.preset.iter().zip(indices(matches, "preset")) {
        ordered.push((index, preset.transforms()));
    }
    for (arg, index) in args.delete.iter().zip(indices(matches, "delete")) {
        ordered.push((index, vec![parse_delete(arg)?]));
    }
    for (arg, index) in args.set.iter().zip(indices(matches, "set")) {
        ordered.push((index, vec![parse_set(arg)?]));
    }
    let substitutions = [
        ("substitute", &args.substitute),
        ("substitute-regex", &args.substitute_regex),
    ];
    for (operation, values) in substitutions {
        let id = operation.replace('-', "_");
        let starts = indices(matches, &id).into_iter().step_by(3);
        for (chunk, index) in values.chunks(3).zip(starts) {
            let [path, find, replace] = chunk else {
                return Err(format!("--{} takes PATH and two arguments", operation));
            };
            let transform = Transform::parse(operation, path, &[find.as_str(), replace.as_str()])
                .map_err(|e| format!("--{} {}: {}", operation, path, e))?;
            ordered.push((index, vec![transform]));
        }
    }

    ordered.sort_by_key(|(index, _)| *index);
    let mut transforms: Vec<Transform> = ordered.into_iter().flat_map(|(_, t)| t).collect();
    if let Some(path) = &args.transform_file {
        transforms.extend(load_transform_file(path)?);
    }
    Ok(transforms)
}

fn indices(matches: &ArgMatches, id: &str) -> Vec<usize> {
    matches
        .indices_of(id)
        .map(|indices| indices.collect())
        .unwrap_or_default()
}

/// Splits `a/b/key` into the container path `a/b` and the key.
fn split_field(path: &str) -> Result<(KeyPath, String), String> {
    let full = KeyPath::parse(path).map_err(|e| e.to_string())?;
    let (parent, key) = full
        .split_last()
        .ok_or_else(|| format!("'{}' does not name a field", path))?;
    Ok((parent, key.to_string()))
}

/// Parses a `--delete PATH` argument.
pub fn parse_delete(arg: &str) -> Result<Transform, String> {
    let (parent, key) = split_field(arg)?;
    Ok(Transform::delete(parent, key))
}

/// Parses a `--set PATH=VALUE` argument.
pub fn parse_set(arg: &str) -> Result<Transform, String> {
    let (path, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected PATH=VALUE, got '{}'", arg))?;
    let (parent, key) = split_field(path)?;
    Ok(Transform::set_string(parent, key, value))
}

/// Loads transforms from a JSON file.
///
/// The file holds an array of objects:
///
/// ```json
/// [
///   {"op": "substitute", "path": "announce", "args": ["apollo.rip", "orpheus.network"]},
///   {"op": "delete", "path": "", "args": ["comment"]}
/// ]
/// ```
///
/// `path` names the value the operation works on (for `delete` and
/// `set-string`, the dictionary holding the field) and defaults to the
/// root.
pub fn load_transform_file(path: &Path) -> Result<Vec<Transform>, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    parse_transform_json(&text).map_err(|e| format!("{}: {}", path.display(), e))
}

fn parse_transform_json(text: &str) -> Result<Vec<Transform>, String> {
    let document: Json = serde_json::from_str(text).map_err(|e| e.to_string())?;
    let entries = document
        .as_array()
        .ok_or_else(|| "expected a JSON array of transforms".to_string())?;

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let op = entry
                .get("op")
                .and_then(Json::as_str)
                .ok_or_else(|| format!("transform {}: missing \"op\"", i))?;
            let key_path = entry.get("path").and_then(Json::as_str).unwrap_or("");
            let args = match entry.get("args") {
                None => Vec::new(),
                Some(Json::Array(items)) => items
                    .iter()
                    .map(|item| {
                        item.as_str()
                            .ok_or_else(|| format!("transform {}: \"args\" must be strings", i))
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                Some(_) => return Err(format!("transform {}: \"args\" must be an array", i)),
            };
            Transform::parse(op, key_path, &args).map_err(|e| format!("transform {}: {}", i, e))
        })
        .collect()
}
