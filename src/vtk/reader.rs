//! Legacy VTK reader.
//!
//! Reads the header, then walks the keyword-delimited sections:
//! `POINTS`, `CELLS` / `POLYGONS` (classic and 5.1 offset layouts),
//! `CELL_TYPES`, and the `POINT_DATA` / `CELL_DATA` attribute blocks.
//! Only point-attached arrays are kept.

use std::fs::File;
use std::path::{Path, PathBuf};

#[cfg(feature = "mmap")]
use memmap2::Mmap;
use glam::Vec3;
use tracing::{debug, warn};

use super::cursor::Cursor;
use super::format::*;
use crate::geom::{Arity, Cell, CellPoints, CellType, PointAttribute, RawGeometry};
use crate::util::{Error, Result};

/// Everything read from one legacy file.
#[derive(Clone, Debug)]
pub struct RawFrame {
    pub header: VtkHeader,
    pub geometry: RawGeometry,
    /// Point-attached arrays in file order, names unique.
    pub attributes: Vec<PointAttribute>,
}

enum Source {
    #[cfg(feature = "mmap")]
    Mmap(Mmap),
    Buffer(Vec<u8>),
}

/// A legacy file opened for parsing.
pub struct VtkFile {
    path: PathBuf,
    source: Source,
}

impl VtkFile {
    /// Open a file, memory-mapping it when possible.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::file_access(path, e))?;
        let size = file.metadata().map_err(|e| Error::file_access(path, e))?.len();

        #[cfg(feature = "mmap")]
        if size > 0 {
            // Safety: the file is opened read-only and the map lives no
            // longer than this struct.
            match unsafe { Mmap::map(&file) } {
                Ok(mmap) => {
                    return Ok(Self {
                        path: path.to_path_buf(),
                        source: Source::Mmap(mmap),
                    })
                }
                Err(e) => debug!(path = %path.display(), "mmap failed, reading instead: {e}"),
            }
        }

        let mut data = Vec::with_capacity(size as usize);
        std::io::Read::read_to_end(&mut &file, &mut data).map_err(|e| Error::file_access(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            source: Source::Buffer(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw file contents.
    pub fn bytes(&self) -> &[u8] {
        match &self.source {
            #[cfg(feature = "mmap")]
            Source::Mmap(m) => m,
            Source::Buffer(b) => b,
        }
    }

    pub fn parse(&self) -> Result<RawFrame> {
        parse_frame(self.bytes())
    }
}

/// Open and parse one file.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn read_frame(path: impl AsRef<Path>) -> Result<RawFrame> {
    VtkFile::open(path.as_ref())?.parse()
}

/// Parse a legacy file held in memory.
pub fn parse_frame(data: &[u8]) -> Result<RawFrame> {
    Parser::new(data)?.run()
}

/// Which attribute block we are in.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Section {
    Dataset,
    PointData(usize),
    CellData(usize),
}

/// Cells read from a connectivity block, before typing.
type Connectivity = Vec<CellPoints>;

struct Parser<'a> {
    cur: Cursor<'a>,
    header: VtkHeader,
    points: Vec<Vec3>,
    cells: Option<Connectivity>,
    cell_types: Option<Vec<CellType>>,
    polygons: Vec<Cell>,
    attributes: Vec<PointAttribute>,
    section: Section,
}

impl<'a> Parser<'a> {
    fn new(data: &'a [u8]) -> Result<Self> {
        let mut cur = Cursor::new(data);
        let header = read_header(&mut cur)?;
        Ok(Self {
            cur,
            header,
            points: Vec::new(),
            cells: None,
            cell_types: None,
            polygons: Vec::new(),
            attributes: Vec::new(),
            section: Section::Dataset,
        })
    }

    #[inline]
    fn encoding(&self) -> Encoding {
        self.header.encoding
    }

    fn run(mut self) -> Result<RawFrame> {
        while !self.cur.at_end() {
            let pos = self.cur.pos();
            let keyword = self.cur.expect_token("keyword")?.to_ascii_uppercase();
            match keyword.as_str() {
                "POINTS" => self.read_points()?,
                "CELLS" => {
                    let cells = self.read_connectivity("CELLS")?;
                    self.cells = Some(cells);
                }
                "CELL_TYPES" => self.read_cell_types()?,
                "POLYGONS" => {
                    let polys = self.read_connectivity("POLYGONS")?;
                    self.polygons.extend(
                        polys
                            .into_iter()
                            .map(|points| Cell {
                                cell_type: CellType::from_polygon_size(points.len()),
                                points,
                            }),
                    );
                }
                "VERTICES" | "LINES" | "TRIANGLE_STRIPS" => {
                    let skipped = self.read_connectivity(&keyword)?;
                    debug!(block = %keyword, cells = skipped.len(), "skipping non-polygon cells");
                }
                "POINT_DATA" => {
                    let n = parse_count(self.cur.read_line()?, pos, "POINT_DATA")?;
                    self.section = Section::PointData(n);
                }
                "CELL_DATA" => {
                    let n = parse_count(self.cur.read_line()?, pos, "CELL_DATA")?;
                    self.section = Section::CellData(n);
                }
                "SCALARS" => self.read_scalars(pos)?,
                "COLOR_SCALARS" => self.read_color_scalars(pos)?,
                "VECTORS" | "NORMALS" => self.read_fixed_arity(pos, &keyword, 3)?,
                "TENSORS" => self.read_fixed_arity(pos, &keyword, 9)?,
                "TEXTURE_COORDINATES" => self.read_texture_coordinates(pos)?,
                "FIELD" => self.read_field(pos)?,
                "LOOKUP_TABLE" => self.skip_lookup_table(pos)?,
                "METADATA" => self.skip_metadata()?,
                other => {
                    return Err(Error::format(pos, format!("unexpected keyword '{other}'")));
                }
            }
        }
        self.finish()
    }

    fn read_points(&mut self) -> Result<()> {
        let pos = self.cur.pos();
        let line = self.cur.read_line()?;
        let mut it = line.split_whitespace();
        let n = parse_usize(it.next(), pos, "POINTS count")?;
        let ty = parse_type(it.next(), pos)?;
        let raw = self.cur.read_values(value_count(n, 3, pos, "POINTS")?, ty, self.encoding(), "POINTS")?;
        self.points = raw
            .chunks_exact(3)
            .map(|c| Vec3::new(c[0] as f32, c[1] as f32, c[2] as f32))
            .collect();
        debug!(points = n, "read points");
        Ok(())
    }

    /// `<kw> <n> <size>` followed by either `k id..` records or the
    /// `OFFSETS` / `CONNECTIVITY` pair.
    fn read_connectivity(&mut self, what: &str) -> Result<Connectivity> {
        let pos = self.cur.pos();
        let line = self.cur.read_line()?;
        let mut it = line.split_whitespace();
        let n = parse_usize(it.next(), pos, what)?;
        let size = parse_usize(it.next(), pos, what)?;

        if self.cur.peek_is("OFFSETS") {
            return self.read_offset_connectivity(n, size, what);
        }

        let flat = self.cur.read_ints(size, ScalarType::Int, self.encoding(), what)?;
        let mut cells = Vec::with_capacity(n.min(flat.len()));
        let mut i = 0usize;
        for c in 0..n {
            let k = *flat
                .get(i)
                .ok_or_else(|| Error::format(pos, format!("{what}: cell {c} past end of block")))?;
            let k = to_index(k, pos, what)?;
            let ids = flat
                .get(i + 1..i + 1 + k)
                .ok_or_else(|| Error::format(pos, format!("{what}: cell {c} truncated")))?;
            cells.push(to_point_ids(ids, pos, what)?);
            i += 1 + k;
        }
        if i != flat.len() {
            return Err(Error::format(
                pos,
                format!("{what}: size {size} does not match {i} values used by {n} cells"),
            ));
        }
        Ok(cells)
    }

    fn read_offset_connectivity(&mut self, n: usize, size: usize, what: &str) -> Result<Connectivity> {
        let pos = self.cur.pos();
        self.cur.expect_token("OFFSETS")?;
        let ty = parse_type(self.cur.read_line()?.split_whitespace().next(), pos)?;
        let offsets = self.cur.read_ints(n, ty, self.encoding(), "OFFSETS")?;

        let pos = self.cur.pos();
        let kw = self.cur.expect_token("CONNECTIVITY")?;
        if !kw.eq_ignore_ascii_case("CONNECTIVITY") {
            return Err(Error::format(pos, format!("expected CONNECTIVITY, found '{kw}'")));
        }
        let ty = parse_type(self.cur.read_line()?.split_whitespace().next(), pos)?;
        let conn = self.cur.read_ints(size, ty, self.encoding(), "CONNECTIVITY")?;

        // n offsets describe n - 1 cells.
        let mut cells = Vec::with_capacity(n.saturating_sub(1));
        for w in offsets.windows(2) {
            let (start, end) = (to_index(w[0], pos, what)?, to_index(w[1], pos, what)?);
            let ids = conn
                .get(start..end)
                .ok_or_else(|| Error::format(pos, format!("{what}: bad offsets {start}..{end}")))?;
            cells.push(to_point_ids(ids, pos, what)?);
        }
        Ok(cells)
    }

    fn read_cell_types(&mut self) -> Result<()> {
        let pos = self.cur.pos();
        let n = parse_count(self.cur.read_line()?, pos, "CELL_TYPES")?;
        let tags = self.cur.read_ints(n, ScalarType::Int, self.encoding(), "CELL_TYPES")?;
        let types = tags
            .into_iter()
            .map(|t| {
                u32::try_from(t)
                    .map(CellType::from_vtk)
                    .map_err(|_| Error::format(pos, format!("invalid cell type {t}")))
            })
            .collect::<Result<Vec<_>>>()?;
        self.cell_types = Some(types);
        Ok(())
    }

    /// Tuple count for the current attribute block.
    fn section_tuples(&self, pos: usize, what: &str) -> Result<usize> {
        match self.section {
            Section::PointData(n) | Section::CellData(n) => Ok(n),
            Section::Dataset => Err(Error::format(
                pos,
                format!("{what} outside POINT_DATA/CELL_DATA"),
            )),
        }
    }

    fn push_attribute(&mut self, name: &str, arity: Arity, values: Vec<f64>) {
        let name = decode_name(name);
        match self.section {
            Section::PointData(_) => {
                let attr = PointAttribute::new(name, arity, values.into_iter().map(|v| v as f32).collect());
                if let Some(existing) = self.attributes.iter_mut().find(|a| a.name == attr.name) {
                    warn!(attribute = %attr.name, "duplicate point attribute, keeping the last one");
                    *existing = attr;
                } else {
                    self.attributes.push(attr);
                }
            }
            Section::CellData(_) => debug!(attribute = %name, "ignoring cell attribute"),
            Section::Dataset => debug!(field = %name, "ignoring dataset field"),
        }
    }

    fn read_scalars(&mut self, pos: usize) -> Result<()> {
        let n = self.section_tuples(pos, "SCALARS")?;
        let line = self.cur.read_line()?;
        let mut it = line.split_whitespace();
        let name = it
            .next()
            .ok_or_else(|| Error::format(pos, "SCALARS without a name"))?;
        let ty = parse_type(it.next(), pos)?;
        let components = match it.next() {
            Some(tok) => parse_usize(Some(tok), pos, "SCALARS component count")?,
            None => 1,
        };
        if !(1..=4).contains(&components) {
            return Err(Error::format(pos, format!("SCALARS has {components} components")));
        }
        if self.cur.peek_is("LOOKUP_TABLE") {
            self.cur.expect_token("LOOKUP_TABLE")?;
            self.cur.read_line()?;
        }
        let values = self.cur.read_values(value_count(n, components, pos, "SCALARS")?, ty, self.encoding(), "SCALARS")?;
        self.push_attribute(name, Arity::from_components(components), values);
        Ok(())
    }

    fn read_color_scalars(&mut self, pos: usize) -> Result<()> {
        let n = self.section_tuples(pos, "COLOR_SCALARS")?;
        let line = self.cur.read_line()?;
        let mut it = line.split_whitespace();
        let name = it
            .next()
            .ok_or_else(|| Error::format(pos, "COLOR_SCALARS without a name"))?;
        let components = parse_usize(it.next(), pos, "COLOR_SCALARS component count")?;
        let count = value_count(n, components, pos, "COLOR_SCALARS")?;
        let values = match self.encoding() {
            Encoding::Ascii => self.cur.read_values(count, ScalarType::Float, Encoding::Ascii, "COLOR_SCALARS")?,
            Encoding::Binary => self
                .cur
                .read_values(count, ScalarType::UnsignedChar, Encoding::Binary, "COLOR_SCALARS")?
                .into_iter()
                .map(|v| v / 255.0)
                .collect(),
        };
        self.push_attribute(name, Arity::from_components(components), values);
        Ok(())
    }

    /// `VECTORS`, `NORMALS` and `TENSORS`: `<kw> <name> <dtype>`.
    fn read_fixed_arity(&mut self, pos: usize, keyword: &str, components: usize) -> Result<()> {
        let n = self.section_tuples(pos, keyword)?;
        let line = self.cur.read_line()?;
        let mut it = line.split_whitespace();
        let name = it
            .next()
            .ok_or_else(|| Error::format(pos, format!("{keyword} without a name")))?;
        let ty = parse_type(it.next(), pos)?;
        let values = self.cur.read_values(value_count(n, components, pos, keyword)?, ty, self.encoding(), keyword)?;
        self.push_attribute(name, Arity::Vector(components), values);
        Ok(())
    }

    fn read_texture_coordinates(&mut self, pos: usize) -> Result<()> {
        let n = self.section_tuples(pos, "TEXTURE_COORDINATES")?;
        let line = self.cur.read_line()?;
        let mut it = line.split_whitespace();
        let name = it
            .next()
            .ok_or_else(|| Error::format(pos, "TEXTURE_COORDINATES without a name"))?;
        let dim = parse_usize(it.next(), pos, "TEXTURE_COORDINATES dimension")?;
        let ty = parse_type(it.next(), pos)?;
        let values = self.cur.read_values(value_count(n, dim, pos, "TEXTURE_COORDINATES")?, ty, self.encoding(), "TEXTURE_COORDINATES")?;
        self.push_attribute(name, Arity::from_components(dim), values);
        Ok(())
    }

    /// `FIELD <name> <k>` followed by k `<array> <comp> <tuples> <dtype>` arrays.
    fn read_field(&mut self, pos: usize) -> Result<()> {
        let line = self.cur.read_line()?;
        let mut it = line.split_whitespace();
        it.next();
        let count = parse_usize(it.next(), pos, "FIELD array count")?;
        for _ in 0..count {
            let pos = self.cur.pos();
            let line = self.cur.read_nonblank_line("FIELD array")?;
            let mut it = line.split_whitespace();
            let name = it.next().unwrap_or_default();
            if name.eq_ignore_ascii_case("NULL_ARRAY") {
                continue;
            }
            let components = parse_usize(it.next(), pos, "FIELD component count")?;
            let tuples = parse_usize(it.next(), pos, "FIELD tuple count")?;
            let ty = parse_type(it.next(), pos)?;
            let total = value_count(tuples, components, pos, "FIELD")?;
            let values = self.cur.read_values(total, ty, self.encoding(), "FIELD")?;
            self.push_attribute(name, Arity::from_components(components), values);
            if self.cur.peek_is("METADATA") {
                self.cur.expect_token("METADATA")?;
                self.skip_metadata()?;
            }
        }
        Ok(())
    }

    /// Standalone `LOOKUP_TABLE <name> <size>` with RGBA entries.
    fn skip_lookup_table(&mut self, pos: usize) -> Result<()> {
        let line = self.cur.read_line()?;
        let mut it = line.split_whitespace();
        it.next();
        let size = parse_usize(it.next(), pos, "LOOKUP_TABLE size")?;
        let ty = match self.encoding() {
            Encoding::Ascii => ScalarType::Float,
            Encoding::Binary => ScalarType::UnsignedChar,
        };
        self.cur.read_values(value_count(size, 4, pos, "LOOKUP_TABLE")?, ty, self.encoding(), "LOOKUP_TABLE")?;
        Ok(())
    }

    /// `METADATA` runs until the next blank line.
    fn skip_metadata(&mut self) -> Result<()> {
        self.cur.read_line()?;
        while !self.cur.at_end() {
            let line = self.cur.read_line()?;
            if line.trim().is_empty() {
                break;
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<RawFrame> {
        let end = self.cur.pos();
        let mut cells = match (self.cells, self.cell_types) {
            (Some(conn), Some(types)) => {
                if conn.len() != types.len() {
                    return Err(Error::format(
                        end,
                        format!("{} cells but {} cell types", conn.len(), types.len()),
                    ));
                }
                conn.into_iter()
                    .zip(types)
                    .map(|(points, cell_type)| Cell { cell_type, points })
                    .collect()
            }
            (Some(_), None) => return Err(Error::format(end, "CELLS without CELL_TYPES")),
            (None, Some(_)) => return Err(Error::format(end, "CELL_TYPES without CELLS")),
            (None, None) => Vec::new(),
        };
        cells.extend(self.polygons);

        let num_points = self.points.len();
        for (i, cell) in cells.iter().enumerate() {
            if let Some(expected) = cell.cell_type.point_count() {
                if cell.points.len() != expected {
                    return Err(Error::format(
                        end,
                        format!(
                            "cell {i} is {:?} but has {} points",
                            cell.cell_type,
                            cell.points.len()
                        ),
                    ));
                }
            }
            if let Some(&bad) = cell.points.iter().find(|&&id| id as usize >= num_points) {
                return Err(Error::format(
                    end,
                    format!("cell {i} references point {bad}, only {num_points} points"),
                ));
            }
        }

        if num_points == 0 || cells.is_empty() {
            warn!(points = num_points, cells = cells.len(), "frame has no geometry");
        }

        Ok(RawFrame {
            header: self.header,
            geometry: RawGeometry {
                points: self.points,
                cells,
            },
            attributes: self.attributes,
        })
    }
}

fn read_header(cur: &mut Cursor<'_>) -> Result<VtkHeader> {
    let pos = cur.pos();
    let first = cur.read_line()?;
    let rest = first
        .trim()
        .strip_prefix(HEADER_MAGIC)
        .ok_or_else(|| Error::format(pos, "missing '# vtk DataFile Version' header"))?;
    let version = rest.trim().to_string();

    let mut title = cur.read_line()?.trim().to_string();
    if title.len() > MAX_TITLE_LEN {
        let mut cut = MAX_TITLE_LEN;
        while !title.is_char_boundary(cut) {
            cut -= 1;
        }
        title.truncate(cut);
    }

    let pos = cur.pos();
    let enc = cur.read_nonblank_line("ASCII or BINARY")?;
    let encoding = Encoding::from_keyword(enc)
        .ok_or_else(|| Error::format(pos, format!("unknown encoding '{enc}'")))?;

    let pos = cur.pos();
    let kw = cur.expect_token("DATASET")?;
    if !kw.eq_ignore_ascii_case("DATASET") {
        return Err(Error::format(pos, format!("expected DATASET, found '{kw}'")));
    }
    let kind = cur.read_line()?.trim();
    let dataset = DatasetKind::from_keyword(kind)
        .ok_or_else(|| Error::format(pos, format!("unsupported dataset type '{kind}'")))?;

    Ok(VtkHeader {
        version,
        title,
        encoding,
        dataset,
    })
}

fn parse_usize(tok: Option<&str>, pos: usize, what: &str) -> Result<usize> {
    let tok = tok.ok_or_else(|| Error::format(pos, format!("missing {what}")))?;
    tok.parse::<usize>()
        .map_err(|_| Error::format(pos, format!("invalid {what} '{tok}'")))
}

/// `tuples * components`, failing on overflow.
fn value_count(tuples: usize, components: usize, pos: usize, what: &str) -> Result<usize> {
    tuples
        .checked_mul(components)
        .ok_or_else(|| Error::format(pos, format!("{what}: {tuples} x {components} values is too large")))
}

fn parse_count(line: &str, pos: usize, what: &str) -> Result<usize> {
    parse_usize(line.split_whitespace().next(), pos, what)
}

fn parse_type(tok: Option<&str>, pos: usize) -> Result<ScalarType> {
    let tok = tok.ok_or_else(|| Error::format(pos, "missing data type"))?;
    ScalarType::from_keyword(tok)
        .ok_or_else(|| Error::format(pos, format!("unsupported data type '{tok}'")))
}

fn to_index(v: i64, pos: usize, what: &str) -> Result<usize> {
    usize::try_from(v).map_err(|_| Error::format(pos, format!("{what}: negative value {v}")))
}

fn to_point_ids(ids: &[i64], pos: usize, what: &str) -> Result<CellPoints> {
    ids.iter()
        .map(|&id| {
            u32::try_from(id).map_err(|_| Error::format(pos, format!("{what}: invalid point id {id}")))
        })
        .collect()
}
