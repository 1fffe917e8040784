//! XML sample-set configuration loading.
//!
//! Two documents are understood: the top-level `samples.xml` listing
//! `<overlapping>` and `<simpletiled>` instances, and the per-tileset
//! `data.xml` declaring tiles, optional subsets, and neighbor rules. Parsing
//! returns plain data; image loading is the caller's business.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use crate::overlapping::OverlappingOptions;
use crate::tiling::Symmetry;

/// Errors surfaced while reading configuration files.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("XML error: {0}")]
    Xml(String),
    #[error("missing attribute '{attribute}' in <{element}>")]
    MissingAttribute { element: String, attribute: String },
    #[error("invalid value '{value}' for attribute '{attribute}' in <{element}>")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
    },
    #[error("unknown symmetry '{0}'")]
    UnknownSymmetry(String),
    #[error("subset '{0}' not found in tile set")]
    UnknownSubset(String),
}

/// One `<overlapping>` instance.
#[derive(Debug, Clone)]
pub struct OverlappingSample {
    pub name: String,
    pub pattern_size: usize,
    pub periodic_output: bool,
    pub periodic_input: bool,
    pub ground: bool,
    pub symmetry: usize,
    /// How many outputs to generate for this sample.
    pub screenshots: usize,
    pub out_width: usize,
    pub out_height: usize,
}

impl OverlappingSample {
    /// The model options this sample describes.
    pub fn options(&self) -> OverlappingOptions {
        OverlappingOptions {
            periodic_input: self.periodic_input,
            periodic_output: self.periodic_output,
            out_height: self.out_height,
            out_width: self.out_width,
            symmetry: self.symmetry,
            ground: self.ground,
            pattern_size: self.pattern_size,
        }
    }
}

/// One `<simpletiled>` instance.
#[derive(Debug, Clone)]
pub struct SimpleTiledSample {
    pub name: String,
    pub subset: String,
    pub periodic_output: bool,
    pub out_width: usize,
    pub out_height: usize,
}

/// Parsed `samples.xml`.
#[derive(Debug, Clone, Default)]
pub struct SamplesConfig {
    pub overlapping: Vec<OverlappingSample>,
    pub simpletiled: Vec<SimpleTiledSample>,
}

/// One `<tile>` declaration of a tile set.
#[derive(Debug, Clone)]
pub struct TileDecl {
    pub name: String,
    pub symmetry: Symmetry,
    pub weight: f64,
}

/// One `<neighbor>` rule: the left tile may sit to the left of the right one.
#[derive(Debug, Clone)]
pub struct NeighborDecl {
    pub left: (String, usize),
    pub right: (String, usize),
}

/// Parsed per-tileset `data.xml`.
#[derive(Debug, Clone)]
pub struct TileSetData {
    /// Edge length of every tile image.
    pub size: usize,
    pub tiles: Vec<TileDecl>,
    pub subsets: HashMap<String, Vec<String>>,
    pub neighbors: Vec<NeighborDecl>,
}

impl TileSetData {
    /// Resolves a subset name to the tile names it selects, or `None` for
    /// the whole set. The default subset name `"tiles"` may be absent from
    /// the document; any other missing name is an error.
    pub fn subset_names(&self, subset: &str) -> Result<Option<&[String]>, LoadError> {
        match self.subsets.get(subset) {
            Some(names) => Ok(Some(names)),
            None if subset == "tiles" => Ok(None),
            None => Err(LoadError::UnknownSubset(subset.to_string())),
        }
    }
}

/// Reads and parses a `samples.xml` file.
pub fn load_samples_config(path: &Path) -> Result<SamplesConfig, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_samples_config(&text)
}

/// Parses the content of a `samples.xml` document.
pub fn parse_samples_config(xml: &str) -> Result<SamplesConfig, LoadError> {
    let mut reader = Reader::from_str(xml);
    let mut config = SamplesConfig::default();

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                b"overlapping" => config.overlapping.push(parse_overlapping(&e)?),
                b"simpletiled" => config.simpletiled.push(parse_simpletiled(&e)?),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(config)
}

/// Reads and parses a tile set `data.xml` file.
pub fn load_tile_set(path: &Path) -> Result<TileSetData, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_tile_set(&text)
}

/// Parses the content of a tile set `data.xml` document.
pub fn parse_tile_set(xml: &str) -> Result<TileSetData, LoadError> {
    enum Section {
        None,
        Tiles,
        Neighbors,
        Subsets,
    }

    let mut reader = Reader::from_str(xml);
    let mut section = Section::None;
    let mut current_subset: Option<String> = None;

    let mut size = None;
    let mut tiles = Vec::new();
    let mut subsets: HashMap<String, Vec<String>> = HashMap::new();
    let mut neighbors = Vec::new();

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) => {
                let attrs = attributes(&e)?;
                match e.name().as_ref() {
                    b"set" => {
                        let value = required(&attrs, "set", "size")?;
                        size = Some(parse_number(value, "set", "size")?);
                    }
                    b"tiles" => section = Section::Tiles,
                    b"neighbors" => section = Section::Neighbors,
                    b"subsets" => section = Section::Subsets,
                    b"subset" => {
                        let name = required(&attrs, "subset", "name")?.to_string();
                        subsets.entry(name.clone()).or_default();
                        current_subset = Some(name);
                    }
                    b"tile" => match section {
                        Section::Tiles => {
                            let name = required(&attrs, "tile", "name")?.to_string();
                            let symmetry = match attrs.get("symmetry") {
                                Some(value) => parse_symmetry(value)?,
                                None => Symmetry::X,
                            };
                            let weight = match attrs.get("weight") {
                                Some(value) => parse_number(value, "tile", "weight")?,
                                None => 1.0,
                            };
                            tiles.push(TileDecl {
                                name,
                                symmetry,
                                weight,
                            });
                        }
                        Section::Subsets => {
                            let name = required(&attrs, "tile", "name")?.to_string();
                            if let Some(subset) = &current_subset {
                                if let Some(names) = subsets.get_mut(subset) {
                                    names.push(name);
                                }
                            }
                        }
                        _ => {}
                    },
                    b"neighbor" => {
                        let left = required(&attrs, "neighbor", "left")?;
                        let right = required(&attrs, "neighbor", "right")?;
                        neighbors.push(NeighborDecl {
                            left: parse_tile_ref(left, "left")?,
                            right: parse_tile_ref(right, "right")?,
                        });
                    }
                    _ => {}
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"tiles" | b"neighbors" | b"subsets" => section = Section::None,
                b"subset" => current_subset = None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(TileSetData {
        size: size.ok_or_else(|| LoadError::MissingAttribute {
            element: "set".to_string(),
            attribute: "size".to_string(),
        })?,
        tiles,
        subsets,
        neighbors,
    })
}

fn parse_overlapping(element: &BytesStart) -> Result<OverlappingSample, LoadError> {
    let attrs = attributes(element)?;
    Ok(OverlappingSample {
        name: required(&attrs, "overlapping", "name")?.to_string(),
        pattern_size: parse_number(required(&attrs, "overlapping", "N")?, "overlapping", "N")?,
        periodic_output: flag(&attrs, "periodic", false),
        periodic_input: flag(&attrs, "periodicInput", true),
        ground: numeric_flag(&attrs, "ground", "overlapping")?,
        symmetry: optional_number(&attrs, "overlapping", "symmetry", 8)?,
        screenshots: optional_number(&attrs, "overlapping", "screenshots", 2)?,
        out_width: optional_number(&attrs, "overlapping", "width", 48)?,
        out_height: optional_number(&attrs, "overlapping", "height", 48)?,
    })
}

fn parse_simpletiled(element: &BytesStart) -> Result<SimpleTiledSample, LoadError> {
    let attrs = attributes(element)?;
    Ok(SimpleTiledSample {
        name: required(&attrs, "simpletiled", "name")?.to_string(),
        subset: attrs
            .get("subset")
            .cloned()
            .unwrap_or_else(|| "tiles".to_string()),
        periodic_output: flag(&attrs, "periodic", false),
        out_width: optional_number(&attrs, "simpletiled", "width", 48)?,
        out_height: optional_number(&attrs, "simpletiled", "height", 48)?,
    })
}

fn xml_error(error: quick_xml::Error) -> LoadError {
    LoadError::Xml(error.to_string())
}

/// Collects an element's attributes into owned strings.
fn attributes(element: &BytesStart) -> Result<HashMap<String, String>, LoadError> {
    let mut map = HashMap::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| LoadError::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| LoadError::Xml(e.to_string()))?
            .into_owned();
        map.insert(key, value);
    }
    Ok(map)
}

fn required<'a>(
    attrs: &'a HashMap<String, String>,
    element: &str,
    attribute: &str,
) -> Result<&'a str, LoadError> {
    attrs
        .get(attribute)
        .map(String::as_str)
        .ok_or_else(|| LoadError::MissingAttribute {
            element: element.to_string(),
            attribute: attribute.to_string(),
        })
}

fn parse_number<N: FromStr>(value: &str, element: &str, attribute: &str) -> Result<N, LoadError> {
    value.parse().map_err(|_| LoadError::InvalidAttribute {
        element: element.to_string(),
        attribute: attribute.to_string(),
        value: value.to_string(),
    })
}

fn optional_number<N: FromStr>(
    attrs: &HashMap<String, String>,
    element: &str,
    attribute: &str,
    default: N,
) -> Result<N, LoadError> {
    match attrs.get(attribute) {
        Some(value) => parse_number(value, element, attribute),
        None => Ok(default),
    }
}

/// Boolean attributes are spelled `"True"` / `"False"`.
fn flag(attrs: &HashMap<String, String>, attribute: &str, default: bool) -> bool {
    match attrs.get(attribute) {
        Some(value) => value == "True",
        None => default,
    }
}

/// The `ground` attribute is numeric: any non-zero value enables it.
fn numeric_flag(
    attrs: &HashMap<String, String>,
    attribute: &str,
    element: &str,
) -> Result<bool, LoadError> {
    match attrs.get(attribute) {
        Some(value) => Ok(parse_number::<i64>(value, element, attribute)? != 0),
        None => Ok(false),
    }
}

fn parse_symmetry(value: &str) -> Result<Symmetry, LoadError> {
    match value {
        "X" => Ok(Symmetry::X),
        "T" => Ok(Symmetry::T),
        "I" => Ok(Symmetry::I),
        "L" => Ok(Symmetry::L),
        "\\" => Ok(Symmetry::Backslash),
        "P" => Ok(Symmetry::P),
        other => Err(LoadError::UnknownSymmetry(other.to_string())),
    }
}

/// Parses a `"name"` or `"name orientation"` tile reference.
fn parse_tile_ref(value: &str, attribute: &str) -> Result<(String, usize), LoadError> {
    match value.split_once(' ') {
        Some((name, orientation)) => {
            let orientation =
                parse_number(orientation.trim(), "neighbor", attribute)?;
            Ok((name.to_string(), orientation))
        }
        None => Ok((value.to_string(), 0)),
    }
}
