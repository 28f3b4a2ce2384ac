//! Shapefile 변환 모듈
//!
//! 입력 Shapefile 하나를 읽어 모든 정점을 WGS84 경위도로 재투영하고, 문자 속성을 UTF-8로
//! 정규화하여 하나 이상의 출력 파티션에 씁니다.

use dbase::yore::code_pages::CP437;
use dbase::{FieldInfo, FieldType, FieldValue, Record, TableInfo, TableWriter, TableWriterBuilder};
use proj::Proj;
use serde::Serialize;
use shapefile::{Polygon, PolygonRing, Shape, ShapeReader, ShapeType, ShapeWriter};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Seek};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::{ConvertConfig, PartitionPolicy};
use crate::encoding::{fit_to_width, normalize, TextEncoding};
use crate::error::{Result, ShpConvertError};
use crate::projection::ProjectionResolver;

/// 출력 `.cpg` 파일에 기록할 인코딩 이름
const OUTPUT_CODE_PAGE: &str = "UTF-8";

type InputReader = shapefile::Reader<BufReader<File>, BufReader<File>>;

/// 변환 실행 문맥
///
/// 실행 시작 시 한 번 만들어 모든 파일 변환에 참조로 전달합니다.
#[derive(Debug, Clone, Copy)]
pub struct ConvertContext<'a> {
    /// 좌표계 핸들 보관소
    pub resolver: &'a ProjectionResolver,
    /// 규칙과 분할 정책
    pub config: &'a ConvertConfig,
    /// 규칙에 걸리지 않는 파일의 입력 좌표계
    pub primary_crs: &'a str,
    /// 입력 속성 인코딩
    pub encoding: TextEncoding,
}

impl<'a> ConvertContext<'a> {
    /// 새 실행 문맥 생성
    pub fn new(
        resolver: &'a ProjectionResolver,
        config: &'a ConvertConfig,
        primary_crs: &'a str,
        encoding: TextEncoding,
    ) -> Self {
        Self {
            resolver,
            config,
            primary_crs,
            encoding,
        }
    }
}

/// 파일 하나의 변환 결과
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// 입력 `.shp` 경로
    pub input: PathBuf,
    /// 생성된 출력 `.shp` 경로 (파티션 순서)
    pub outputs: Vec<PathBuf>,
    /// 적용한 입력 좌표계
    pub crs: String,
    /// 분할 대상 여부
    pub partitioned: bool,
    /// 변환한 피처 수
    pub features: usize,
    /// 변환한 정점 수
    pub vertices: usize,
    /// 입력 `.shp` 크기
    pub bytes_read: u64,
    /// 출력 `.shp`/`.shx`/`.dbf` 크기 합계
    pub bytes_written: u64,
}

/// 지원하는 도형 종류
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Polygon(Polygon),
}

impl TryFrom<Shape> for Geometry {
    type Error = ShapeType;

    fn try_from(shape: Shape) -> std::result::Result<Self, Self::Error> {
        match shape {
            Shape::Polygon(polygon) => Ok(Geometry::Polygon(polygon)),
            other => Err(other.shapetype()),
        }
    }
}

/// 출력 파일 이름에서 허용되지 않는 괄호 정리
///
/// `(`는 `_`로 바꾸고 `)`는 제거합니다.
///
/// # Examples
/// ```
/// use shpconvert::processor::sanitize_file_name;
///
/// assert_eq!(sanitize_file_name("Some(Area).shp"), "Some_Area.shp");
/// ```
pub fn sanitize_file_name(name: &str) -> String {
    name.replace('(', "_").replace(')', "")
}

/// 파티션 번호가 붙은 출력 경로 생성 (`<stem>_part<N>.<ext>`)
pub fn partition_path(base: &Path, index: usize) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file_name = match base.extension() {
        Some(ext) => format!("{}_part{}.{}", stem, index, ext.to_string_lossy()),
        None => format!("{}_part{}", stem, index),
    };

    base.with_file_name(file_name)
}

/// 단일 Shapefile 변환
///
/// # Arguments
/// * `input` - 입력 `.shp` 경로 (`.shx`, `.dbf`가 같은 위치에 있어야 함)
/// * `output` - 출력 `.shp` 경로 (파일 이름은 정리되어 사용됨)
/// * `ctx` - 실행 문맥
///
/// # Returns
/// 변환 결과 또는 첫 번째 에러. 에러가 나도 이미 연 출력 파일은 모두 닫힙니다.
pub fn convert_file(input: &Path, output: &Path, ctx: &ConvertContext<'_>) -> Result<FileReport> {
    let file_name = input
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let bytes_read = fs::metadata(input)
        .map_err(|e| ShpConvertError::FileOpenError {
            file: input.to_path_buf(),
            reason: e.to_string(),
        })?
        .len();

    let (mut reader, fields, table_info) = open_input(input)?;

    let output = output.with_file_name(sanitize_file_name(
        &output
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.clone()),
    ));
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).map_err(|e| ShpConvertError::FileCreateError {
            file: parent.to_path_buf(),
            reason: e.to_string(),
        })?;
    }

    let policy = &ctx.config.partition;
    let partitioned = policy.is_eligible(&file_name, bytes_read);
    let crs = ctx.config.crs_for(&file_name, ctx.primary_crs);
    let source = ctx.resolver.resolve(crs)?;

    debug!(
        file = %input.display(),
        crs,
        partitioned,
        bytes = bytes_read,
        "변환 시작"
    );

    let mut partitions =
        PartitionWriter::new(output, policy, partitioned, &table_info, ctx.encoding)?;
    let mut features = 0;
    let mut vertices = 0;

    for item in reader.iter_shapes_and_records() {
        let (shape, mut record) = item.map_err(|e| ShpConvertError::ShapefileError {
            file: input.to_path_buf(),
            reason: e.to_string(),
        })?;

        let geometry =
            Geometry::try_from(shape).map_err(|kind| ShpConvertError::UnsupportedGeometry {
                file: input.to_path_buf(),
                kind: kind.to_string(),
            })?;

        let (polygon, count) = match geometry {
            Geometry::Polygon(polygon) => {
                let count = polygon.total_point_count();
                (reproject_polygon(polygon, ctx.resolver, source, input)?, count)
            }
        };

        convert_record(&mut record, &fields, ctx.encoding, input)?;
        partitions.write(&polygon, &record, count)?;

        features += 1;
        vertices += count;
    }

    let outputs = partitions.finish()?;
    let bytes_written = outputs.iter().map(|p| output_size(p)).sum();

    Ok(FileReport {
        input: input.to_path_buf(),
        outputs,
        crs: crs.to_string(),
        partitioned,
        features,
        vertices,
        bytes_read,
        bytes_written,
    })
}

/// 입력 Shapefile 열기
///
/// `.dbf`는 CP437로 읽어 원본 바이트를 손실 없이 되찾을 수 있게 합니다.
/// 파일에 기록된 코드 페이지 표식은 무시됩니다. `.dbf`는 한 번만 열고, 출력 스키마용
/// `TableInfo`를 뽑은 뒤 처음으로 되감아 레코드 리더를 만듭니다.
fn open_input(path: &Path) -> Result<(InputReader, Vec<FieldInfo>, TableInfo)> {
    let shapes = ShapeReader::from_path(path).map_err(|e| ShpConvertError::FileOpenError {
        file: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let dbf_path = path.with_extension("dbf");
    let open_error = |e: &dyn std::fmt::Display| ShpConvertError::FileOpenError {
        file: dbf_path.clone(),
        reason: e.to_string(),
    };

    let mut source = BufReader::new(File::open(&dbf_path).map_err(|e| open_error(&e))?);
    let table_info = table_reader(&mut source)
        .map_err(|e| open_error(&e))?
        .into_table_info();
    source.rewind().map_err(|e| open_error(&e))?;
    let table = table_reader(source).map_err(|e| open_error(&e))?;
    let fields = table.fields().to_vec();

    for field in fields.iter().filter(|f| !f.name().is_ascii()) {
        warn!(
            file = %path.display(),
            field = field.name(),
            "ASCII가 아닌 필드 이름은 그대로 보존되지 않을 수 있습니다"
        );
    }

    Ok((shapefile::Reader::new(shapes, table), fields, table_info))
}

fn table_reader<T: Read + Seek>(
    source: T,
) -> std::result::Result<dbase::Reader<T>, dbase::Error> {
    dbase::ReaderBuilder::new().with_encoding(CP437).build(source)
}

/// 폴리곤의 모든 정점을 제자리에서 재투영
fn reproject_polygon(
    polygon: Polygon,
    resolver: &ProjectionResolver,
    source: Option<&Proj>,
    file: &Path,
) -> Result<Polygon> {
    let mut rings = polygon.into_inner();
    if rings.is_empty() || rings.iter().any(|ring| ring.is_empty()) {
        return Err(ShpConvertError::InvalidGeometry {
            file: file.to_path_buf(),
            reason: "비어 있는 링".to_string(),
        });
    }

    for ring in rings.iter_mut() {
        let points = match ring {
            PolygonRing::Outer(points) | PolygonRing::Inner(points) => points,
        };
        for point in points.iter_mut() {
            let (x, y) = resolver
                .to_geographic(point.x, point.y, source)
                .map_err(|e| ShpConvertError::ProjectionError {
                    file: file.to_path_buf(),
                    x: point.x,
                    y: point.y,
                    reason: e.to_string(),
                })?;
            point.x = x;
            point.y = y;
        }
    }

    Ok(Polygon::with_rings(rings))
}

/// 문자 필드 값을 UTF-8로 정규화하고 필드 길이에 맞춤
///
/// UTF-8 입력이면 값을 건드리지 않습니다. 출력도 CP437로 쓰므로 원본 바이트가 그대로
/// 옮겨집니다.
fn convert_record(
    record: &mut Record,
    fields: &[FieldInfo],
    encoding: TextEncoding,
    file: &Path,
) -> Result<()> {
    if !encoding.is_legacy() {
        return Ok(());
    }

    let encoding_error = |field: &FieldInfo| ShpConvertError::EncodingError {
        file: file.to_path_buf(),
        field: field.name().to_string(),
        encoding: encoding.to_string(),
    };

    for field in fields
        .iter()
        .filter(|f| matches!(f.field_type(), FieldType::Character))
    {
        if let Some(FieldValue::Character(Some(value))) = record.get_mut(field.name()) {
            let converted = {
                let raw = CP437.encode(value.as_str()).map_err(|_| encoding_error(field))?;
                let text = normalize(&raw).ok_or_else(|| encoding_error(field))?;
                fit_to_width(&text, usize::from(field.length())).to_string()
            };
            *value = converted;
        }
    }

    Ok(())
}

fn output_size(shp: &Path) -> u64 {
    ["shp", "shx", "dbf"]
        .iter()
        .filter_map(|ext| fs::metadata(shp.with_extension(ext)).ok())
        .map(|m| m.len())
        .sum()
}

/// 열려 있는 출력 Shapefile 하나
///
/// 드롭되면 `ShapeWriter`와 `TableWriter`가 헤더를 마무리하고 파일을 닫습니다.
struct OutputTarget {
    path: PathBuf,
    shapes: ShapeWriter<BufWriter<File>>,
    table: TableWriter<BufWriter<File>>,
    vertices: usize,
}

impl OutputTarget {
    fn create(path: PathBuf, table_info: &TableInfo, encoding: TextEncoding) -> Result<Self> {
        let shapes =
            ShapeWriter::from_path(&path).map_err(|e| ShpConvertError::FileCreateError {
                file: path.clone(),
                reason: e.to_string(),
            })?;

        let builder = TableWriterBuilder::from_table_info(table_info.clone());
        let builder = if encoding.is_legacy() {
            builder.set_encoding(dbase::Unicode)
        } else {
            builder.set_encoding(CP437)
        };
        let table = builder
            .build_with_file_dest(path.with_extension("dbf"))
            .map_err(|e| ShpConvertError::FileCreateError {
                file: path.with_extension("dbf"),
                reason: e.to_string(),
            })?;

        Ok(Self {
            path,
            shapes,
            table,
            vertices: 0,
        })
    }

    fn write(&mut self, polygon: &Polygon, record: &Record, vertices: usize) -> Result<()> {
        self.shapes
            .write_shape(polygon)
            .map_err(|e| self.write_error(e))?;
        self.table
            .write_record(record)
            .map_err(|e| self.write_error(e))?;
        self.vertices += vertices;
        Ok(())
    }

    /// 헤더를 마무리하고 `.cpg`를 기록한 뒤 출력 경로 반환
    fn finish(self) -> Result<PathBuf> {
        let OutputTarget {
            path,
            mut shapes,
            mut table,
            ..
        } = self;

        shapes
            .finalize()
            .map_err(|e| ShpConvertError::ShapefileError {
                file: path.clone(),
                reason: e.to_string(),
            })?;
        table
            .finalize()
            .map_err(|e| ShpConvertError::ShapefileError {
                file: path.with_extension("dbf"),
                reason: e.to_string(),
            })?;
        drop(shapes);
        drop(table);

        fs::write(path.with_extension("cpg"), OUTPUT_CODE_PAGE)?;
        Ok(path)
    }

    fn write_error(&self, error: impl std::fmt::Display) -> ShpConvertError {
        ShpConvertError::ShapefileError {
            file: self.path.clone(),
            reason: error.to_string(),
        }
    }
}

/// 정점 수 기준으로 출력 파티션을 나눠 쓰는 writer
///
/// 분할 대상이 아니면 정리된 경로 하나에만 씁니다. 분할 대상이면 `_part1`부터 시작하고,
/// 피처를 쓴 뒤 누적 정점 수가 임계값을 넘으면 현재 파티션을 닫고 바로 다음 파티션을 엽니다.
/// 마지막 피처가 경계를 넘으면 빈 파티션이 하나 남습니다.
struct PartitionWriter<'a> {
    base: PathBuf,
    partitioned: bool,
    threshold: usize,
    table_info: &'a TableInfo,
    encoding: TextEncoding,
    index: usize,
    current: Option<OutputTarget>,
    finished: Vec<PathBuf>,
}

impl<'a> PartitionWriter<'a> {
    fn new(
        base: PathBuf,
        policy: &PartitionPolicy,
        partitioned: bool,
        table_info: &'a TableInfo,
        encoding: TextEncoding,
    ) -> Result<Self> {
        let mut writer = Self {
            base,
            partitioned,
            threshold: policy.vertex_threshold,
            table_info,
            encoding,
            index: 0,
            current: None,
            finished: Vec::new(),
        };
        writer.open_next()?;
        Ok(writer)
    }

    fn open_next(&mut self) -> Result<()> {
        let path = if self.partitioned {
            self.index += 1;
            partition_path(&self.base, self.index)
        } else {
            self.base.clone()
        };
        self.current = Some(OutputTarget::create(path, self.table_info, self.encoding)?);
        Ok(())
    }

    fn write(&mut self, polygon: &Polygon, record: &Record, vertices: usize) -> Result<()> {
        if self.current.is_none() {
            self.open_next()?;
        }
        let Some(target) = self.current.as_mut() else {
            return Ok(());
        };
        target.write(polygon, record, vertices)?;

        if self.partitioned && target.vertices > self.threshold {
            info!(
                partition = self.index,
                vertices = target.vertices,
                "파티션 임계값 초과, 다음 파티션으로 전환"
            );
            self.close_current()?;
            self.open_next()?;
        }

        Ok(())
    }

    fn close_current(&mut self) -> Result<()> {
        if let Some(target) = self.current.take() {
            self.finished.push(target.finish()?);
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<PathBuf>> {
        self.close_current()?;
        Ok(self.finished)
    }
}
