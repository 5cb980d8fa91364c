//! Point cloud loading for the demo.
//!
//! Three formats are read:
//! - `.csv`: comma separated, the first line is a header.
//! - `.txt`: comma or whitespace separated, every line is data. A first line
//!   that does not parse as numbers is taken as a header and skipped.
//! - `.ply`: binary little endian, one `float x, y, z, uchar r, g, b` record
//!   per vertex.

use anyhow::{bail, Context, Result};
use kdindex::ColorPoint;
use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};
use tracing::{debug, info};

pub fn read_point_cloud(path: &Path) -> Result<Vec<ColorPoint>> {
    let source = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());

    let points = match extension.as_deref() {
        Some("csv") => read_csv(path, &source)?,
        Some("txt") => read_txt(path, &source)?,
        Some("ply") => read_ply(path, &source)?,
        Some("las") => {
            bail!("las point clouds are not supported, convert {} to csv first", path.display())
        }
        _ => bail!("unsupported point cloud format: {}", path.display()),
    };
    info!(points = points.len(), source = %source, "loaded point cloud");
    Ok(points)
}

fn read_csv(path: &Path, source: &str) -> Result<Vec<ColorPoint>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let header = reader.headers()?.clone();
    debug!(?header, "csv header");

    let mut points = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("malformed csv row {}", row + 2))?;
        points.push(parse_row(record.iter(), row + 2, source)?);
    }
    Ok(points)
}

fn read_txt(path: &Path, source: &str) -> Result<Vec<ColorPoint>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut points = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", i + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let point = if line.contains(',') {
            parse_row(line.split(','), i + 1, source)
        } else {
            parse_row(line.split_whitespace(), i + 1, source)
        };
        match point {
            Ok(point) => points.push(point),
            Err(_) if i == 0 && !is_numeric_row(&line) => {
                debug!(header = %line, "skipping txt header");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(points)
}

fn is_numeric_row(line: &str) -> bool {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|field| !field.is_empty())
        .all(|field| field.parse::<f64>().is_ok())
}

// Size of one vertex record: three f32 coordinates and three u8 channels.
const PLY_VERTEX_BYTES: usize = 3 * 4 + 3;

fn read_ply(path: &Path, source: &str) -> Result<Vec<ColorPoint>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let vertex_count = read_ply_header(&mut reader)?;
    debug!(vertex_count, "ply header");

    let mut points = Vec::with_capacity(vertex_count.min(1 << 20));
    let mut record = [0u8; PLY_VERTEX_BYTES];
    for vertex in 0..vertex_count {
        reader.read_exact(&mut record).with_context(|| {
            format!("ply file ends after {vertex} of {vertex_count} vertices")
        })?;
        let coord = |i: usize| {
            let offset = i * 4;
            f32::from_le_bytes([
                record[offset],
                record[offset + 1],
                record[offset + 2],
                record[offset + 3],
            ])
        };
        points.push(
            ColorPoint::new(coord(0), coord(1), coord(2))
                .with_color(i32::from(record[12]), i32::from(record[13]), i32::from(record[14]))
                .with_source(source),
        );
    }
    Ok(points)
}

// Reads up to and including `end_header`, returning the vertex count.
fn read_ply_header(reader: &mut impl BufRead) -> Result<usize> {
    let mut lines = Vec::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            bail!("ply header has no end_header line");
        }
        let line = line.trim().to_string();
        if line == "end_header" {
            break;
        }
        lines.push(line);
    }

    if lines.first().map(String::as_str) != Some("ply") {
        bail!("not a ply file");
    }
    if !lines.iter().any(|line| line.starts_with("format binary_little_endian")) {
        bail!("only binary_little_endian ply files are supported");
    }

    let mut vertex_count = None;
    let mut properties = Vec::new();
    let mut in_vertex = false;
    for line in &lines {
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            ["element", "vertex", count] => {
                vertex_count = Some(
                    count
                        .parse::<usize>()
                        .with_context(|| format!("bad vertex count {count}"))?,
                );
                in_vertex = true;
            }
            ["element", ..] => in_vertex = false,
            ["property", kind, name] if in_vertex => properties.push((*kind, *name)),
            _ => {}
        }
    }

    let expected = [
        ("float", "x"),
        ("float", "y"),
        ("float", "z"),
        ("uchar", "red"),
        ("uchar", "green"),
        ("uchar", "blue"),
    ];
    let normalized: Vec<(&str, &str)> = properties
        .iter()
        .map(|&(kind, name)| match kind {
            "float32" => ("float", name),
            "uint8" => ("uchar", name),
            _ => (kind, name),
        })
        .collect();
    if normalized != expected {
        bail!("ply vertices must be float x, y, z followed by uchar red, green, blue");
    }
    vertex_count.context("ply header has no vertex element")
}

fn parse_row<'a>(fields: impl Iterator<Item = &'a str>, line: usize, source: &str) -> Result<ColorPoint> {
    let values = fields
        .map(|field| field.trim().parse::<f64>())
        .collect::<Result<Vec<f64>, _>>()
        .with_context(|| format!("non-numeric value on line {line}"))?;
    let point = ColorPoint::try_from(values.as_slice()).with_context(|| format!("line {line}"))?;
    Ok(point.with_source(source))
}
