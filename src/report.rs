//! PPT Report Generator Module
//! Writes a PowerPoint report: cover, chart images, and a data table slide.
//!
//! Uses direct ZIP/XML generation to embed images and tables.

use crate::dashboard::Snapshot;
use crate::view::{table_rows, TABLE_HEADERS};
use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;
use thiserror::Error;
use zip::write::FileOptions;
use zip::ZipWriter;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Report has no slides")]
    Empty,
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to package report: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// One slide of the report.
#[derive(Debug, Clone)]
pub enum ReportSlide {
    Cover { title: String, subtitle: String },
    Chart { title: String, png: Option<Vec<u8>> },
    Table { title: String, headers: Vec<String>, rows: Vec<Vec<String>> },
}

/// EMU (English Metric Units) conversion: 914400 EMU = 1 inch
const EMU_PER_INCH: i64 = 914400;
/// Standard 16:9 slide dimensions (in EMU)
const SLIDE_WIDTH: i64 = 12192000; // 13.333 inches
const SLIDE_HEIGHT: i64 = 6858000; // 7.5 inches
const MARGIN: i64 = EMU_PER_INCH / 2;
const TITLE_HEIGHT: i64 = EMU_PER_INCH * 3 / 4;

/// Rows listed on the table slide.
pub const REPORT_TABLE_ROWS: usize = 5;

/// PPT generator for stock reports
pub struct ReportGenerator;

impl ReportGenerator {
    /// Assemble the standard slide deck for a snapshot.
    ///
    /// A chart whose image could not be rendered still gets a slide with a note.
    pub fn slides_for(
        snapshot: &Snapshot,
        generated: &str,
        main_chart: Option<Vec<u8>>,
        macd_chart: Option<Option<Vec<u8>>>,
    ) -> Vec<ReportSlide> {
        let ticker = &snapshot.series.ticker;
        let mut slides = vec![
            ReportSlide::Cover {
                title: format!("Stock Report - {ticker}"),
                subtitle: format!(
                    "Generated: {generated} | {} to {} | {} trading days | source: {}",
                    snapshot.query.start,
                    snapshot.query.end,
                    snapshot.series.len(),
                    snapshot.source
                ),
            },
            ReportSlide::Chart {
                title: format!("{ticker} - Price"),
                png: main_chart,
            },
        ];

        if let Some(png) = macd_chart {
            slides.push(ReportSlide::Chart {
                title: format!("{ticker} - MACD"),
                png,
            });
        }

        slides.push(ReportSlide::Table {
            title: format!("Data summary (last {REPORT_TABLE_ROWS} rows)"),
            headers: TABLE_HEADERS.iter().map(|h| h.to_string()).collect(),
            rows: table_rows(snapshot.series.tail(REPORT_TABLE_ROWS))
                .into_iter()
                .map(|row| row.to_vec())
                .collect(),
        });

        slides
    }

    /// Write the report to a file.
    pub fn generate_file(path: &Path, title: &str, slides: &[ReportSlide]) -> Result<(), ReportError> {
        let file = File::create(path)?;
        Self::write_pptx(file, title, slides)?;
        log::info!("Report generated: {} ({} slides)", path.display(), slides.len());
        Ok(())
    }

    /// Write the PPTX package to any seekable writer and hand it back.
    pub fn write_pptx<W: Write + Seek>(
        writer: W,
        title: &str,
        slides: &[ReportSlide],
    ) -> Result<W, ReportError> {
        if slides.is_empty() {
            return Err(ReportError::Empty);
        }

        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default();
        let slide_count = slides.len();

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(Self::content_types_xml(slide_count).as_bytes())?;

        zip.start_file("_rels/.rels", options)?;
        zip.write_all(Self::rels_xml().as_bytes())?;

        zip.start_file("ppt/_rels/presentation.xml.rels", options)?;
        zip.write_all(Self::presentation_rels_xml(slide_count).as_bytes())?;

        zip.start_file("ppt/presentation.xml", options)?;
        zip.write_all(Self::presentation_xml(slide_count).as_bytes())?;

        let mut image_count = 0;
        for (idx, slide) in slides.iter().enumerate() {
            let slide_num = idx + 1;

            let image_id = match slide {
                ReportSlide::Chart { png: Some(png), .. } => {
                    image_count += 1;
                    zip.start_file(format!("ppt/media/image{image_count}.png"), options)?;
                    zip.write_all(png)?;
                    Some(image_count)
                }
                _ => None,
            };

            zip.start_file(format!("ppt/slides/_rels/slide{slide_num}.xml.rels"), options)?;
            zip.write_all(Self::slide_rels_xml(image_id).as_bytes())?;

            zip.start_file(format!("ppt/slides/slide{slide_num}.xml"), options)?;
            zip.write_all(Self::slide_xml(slide).as_bytes())?;
        }

        zip.start_file("ppt/slideLayouts/slideLayout1.xml", options)?;
        zip.write_all(SLIDE_LAYOUT_XML.as_bytes())?;
        zip.start_file("ppt/slideLayouts/_rels/slideLayout1.xml.rels", options)?;
        zip.write_all(LAYOUT_RELS_XML.as_bytes())?;

        zip.start_file("ppt/slideMasters/slideMaster1.xml", options)?;
        zip.write_all(SLIDE_MASTER_XML.as_bytes())?;
        zip.start_file("ppt/slideMasters/_rels/slideMaster1.xml.rels", options)?;
        zip.write_all(MASTER_RELS_XML.as_bytes())?;

        zip.start_file("ppt/theme/theme1.xml", options)?;
        zip.write_all(THEME_XML.as_bytes())?;

        zip.start_file("docProps/core.xml", options)?;
        zip.write_all(Self::core_props_xml(title).as_bytes())?;
        zip.start_file("docProps/app.xml", options)?;
        zip.write_all(Self::app_props_xml(slide_count).as_bytes())?;

        Ok(zip.finish()?)
    }

    fn content_types_xml(slide_count: usize) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Default Extension="png" ContentType="image/png"/>
<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>
<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>
<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>
<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
"#,
        );
        for i in 1..=slide_count {
            xml.push_str(&format!(
                "<Override PartName=\"/ppt/slides/slide{i}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slide+xml\"/>\n"
            ));
        }
        xml.push_str("</Types>");
        xml
    }

    fn rels_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#
    }

    fn presentation_rels_xml(slide_count: usize) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="theme/theme1.xml"/>
"#,
        );
        // Slide relationships start at rId3
        for i in 1..=slide_count {
            xml.push_str(&format!(
                "<Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide\" Target=\"slides/slide{i}.xml\"/>\n",
                i + 2
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }

    fn presentation_xml(slide_count: usize) -> String {
        let slide_ids: String = (1..=slide_count)
            .map(|i| format!("<p:sldId id=\"{}\" r:id=\"rId{}\"/>", 255 + i, i + 2))
            .collect();

        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" saveSubsetFonts="1">
<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>
<p:sldIdLst>{slide_ids}</p:sldIdLst>
<p:sldSz cx="{SLIDE_WIDTH}" cy="{SLIDE_HEIGHT}"/>
<p:notesSz cx="{SLIDE_HEIGHT}" cy="{SLIDE_WIDTH}"/>
</p:presentation>"#
        )
    }

    fn slide_rels_xml(image_id: Option<usize>) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
"#,
        );
        if let Some(id) = image_id {
            xml.push_str(&format!(
                "<Relationship Id=\"rId2\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/image\" Target=\"../media/image{id}.png\"/>\n"
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }

    fn slide_xml(slide: &ReportSlide) -> String {
        let content_top = MARGIN + TITLE_HEIGHT;
        let content_width = SLIDE_WIDTH - 2 * MARGIN;
        let content_height = SLIDE_HEIGHT - content_top - MARGIN;

        let shapes = match slide {
            ReportSlide::Cover { title, subtitle } => {
                let mid = SLIDE_HEIGHT / 2;
                Self::text_box(2, title, MARGIN, mid - TITLE_HEIGHT, content_width, TITLE_HEIGHT, 4000, true)
                    + &Self::text_box(3, subtitle, MARGIN, mid + MARGIN / 2, content_width, TITLE_HEIGHT, 1600, false)
            }
            ReportSlide::Chart { title, png } => {
                let heading = Self::text_box(2, title, MARGIN, MARGIN, content_width, TITLE_HEIGHT, 2400, true);
                let body = match png {
                    Some(_) => Self::picture(3, MARGIN, content_top, content_width, content_height),
                    None => Self::text_box(
                        3,
                        "Chart image not available. The data summary follows.",
                        MARGIN,
                        content_top,
                        content_width,
                        TITLE_HEIGHT,
                        1400,
                        false,
                    ),
                };
                heading + &body
            }
            ReportSlide::Table { title, headers, rows } => {
                Self::text_box(2, title, MARGIN, MARGIN, content_width, TITLE_HEIGHT, 2400, true)
                    + &Self::table(3, headers, rows, MARGIN, content_top, content_width)
            }
        };

        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
<p:cSld>
<p:spTree>
<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>
{shapes}
</p:spTree>
</p:cSld>
<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sld>"#
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn text_box(id: usize, text: &str, x: i64, y: i64, w: i64, h: i64, size: u32, bold: bool) -> String {
        let b = if bold { " b=\"1\"" } else { "" };
        format!(
            r#"
<p:sp>
<p:nvSpPr><p:cNvPr id="{id}" name="Text {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>
<p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{w}" cy="{h}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>
<p:txBody><a:bodyPr wrap="square"/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US" sz="{size}"{b}/><a:t>{}</a:t></a:r></a:p></p:txBody>
</p:sp>"#,
            xml_escape(text)
        )
    }

    fn picture(id: usize, x: i64, y: i64, w: i64, h: i64) -> String {
        format!(
            r#"
<p:pic>
<p:nvPicPr><p:cNvPr id="{id}" name="Chart {id}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>
<p:blipFill><a:blip r:embed="rId2"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>
<p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{w}" cy="{h}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>
</p:pic>"#
        )
    }

    fn table(id: usize, headers: &[String], rows: &[Vec<String>], x: i64, y: i64, w: i64) -> String {
        let cols = headers.len().max(1) as i64;
        let col_w = w / cols;
        let row_h = EMU_PER_INCH * 2 / 5;
        let h = row_h * (rows.len() as i64 + 1);

        let cell = |text: &str, bold: bool| {
            let b = if bold { " b=\"1\"" } else { "" };
            format!(
                "<a:tc><a:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang=\"en-US\" sz=\"1200\"{b}/><a:t>{}</a:t></a:r></a:p></a:txBody><a:tcPr/></a:tc>",
                xml_escape(text)
            )
        };

        let grid: String = (0..cols).map(|_| format!("<a:gridCol w=\"{col_w}\"/>")).collect();
        let mut body = format!(
            "<a:tr h=\"{row_h}\">{}</a:tr>",
            headers.iter().map(|t| cell(t, true)).collect::<String>()
        );
        for row in rows {
            body.push_str(&format!(
                "<a:tr h=\"{row_h}\">{}</a:tr>",
                row.iter().map(|t| cell(t, false)).collect::<String>()
            ));
        }

        format!(
            r#"
<p:graphicFrame>
<p:nvGraphicFramePr><p:cNvPr id="{id}" name="Table {id}"/><p:cNvGraphicFramePr><a:graphicFrameLocks noGrp="1"/></p:cNvGraphicFramePr><p:nvPr/></p:nvGraphicFramePr>
<p:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{w}" cy="{h}"/></p:xfrm>
<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table"><a:tbl><a:tblPr firstRow="1" bandRow="1"/><a:tblGrid>{grid}</a:tblGrid>{body}</a:tbl></a:graphicData></a:graphic>
</p:graphicFrame>"#
        )
    }

    fn core_props_xml(title: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
<dc:title>{}</dc:title>
<dc:creator>Stock Viewer</dc:creator>
<cp:lastModifiedBy>Stock Viewer</cp:lastModifiedBy>
<cp:revision>1</cp:revision>
</cp:coreProperties>"#,
            xml_escape(title)
        )
    }

    fn app_props_xml(slide_count: usize) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
<Application>Stock Viewer</Application>
<PresentationFormat>Widescreen</PresentationFormat>
<Slides>{slide_count}</Slides>
<Notes>0</Notes>
<HiddenSlides>0</HiddenSlides>
<AppVersion>16.0000</AppVersion>
</Properties>"#
        )
    }
}

fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

const SLIDE_LAYOUT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="blank" preserve="1">
<p:cSld name="Blank"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr></p:spTree></p:cSld>
<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sldLayout>"#;

const LAYOUT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="../slideMasters/slideMaster1.xml"/>
</Relationships>"#;

const SLIDE_MASTER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr></p:spTree></p:cSld>
<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>
<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>
</p:sldMaster>"#;

const MASTER_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="../theme/theme1.xml"/>
</Relationships>"#;

// Minimal Office theme: color and font schemes plus the required style lists.
const THEME_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme">
<a:themeElements>
<a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2><a:accent1><a:srgbClr val="1F77B4"/></a:accent1><a:accent2><a:srgbClr val="FF7F0E"/></a:accent2><a:accent3><a:srgbClr val="2CA02C"/></a:accent3><a:accent4><a:srgbClr val="D627A0"/></a:accent4><a:accent5><a:srgbClr val="5B9BD5"/></a:accent5><a:accent6><a:srgbClr val="8C8C8C"/></a:accent6><a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink></a:clrScheme>
<a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme>
<a:fmtScheme name="Office"><a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst><a:lnStyleLst><a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst><a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst><a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst></a:fmtScheme>
</a:themeElements>
<a:objectDefaults/>
<a:extraClrSchemeLst/>
</a:theme>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{PriceBar, PriceSeries, Query};
    use chrono::NaiveDate;
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn snapshot() -> Snapshot {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2023, 1, 10).unwrap();
        let bars = (2..=10)
            .map(|d| PriceBar {
                date: NaiveDate::from_ymd_opt(2023, 1, d).unwrap(),
                open: 1.0,
                high: 2.0,
                low: 0.5,
                close: d as f64,
                volume: 100.0,
            })
            .collect();
        Snapshot::build(
            Query::new("AT&T", start, end),
            "test",
            PriceSeries::from_bars("AT&T", bars),
        )
    }

    fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut text = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn deck_has_cover_charts_and_table() {
        let slides = ReportGenerator::slides_for(&snapshot(), "2024-01-01 00:00:00", Some(vec![1, 2, 3]), Some(None));
        assert_eq!(slides.len(), 4);
        match &slides[3] {
            ReportSlide::Table { rows, headers, .. } => {
                assert_eq!(headers.len(), 6);
                assert_eq!(rows.len(), REPORT_TABLE_ROWS);
                assert_eq!(rows[4][0], "2023-01-10");
            }
            other => panic!("expected table slide, got {other:?}"),
        }
    }

    #[test]
    fn package_contains_slides_and_images() {
        let slides = ReportGenerator::slides_for(&snapshot(), "now", Some(vec![9, 9, 9]), Some(None));
        let cursor = ReportGenerator::write_pptx(Cursor::new(Vec::new()), "Stock Report", &slides).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();
        let names: Vec<String> = archive.file_names().map(|s| s.to_string()).collect();
        for expected in [
            "[Content_Types].xml",
            "ppt/presentation.xml",
            "ppt/slides/slide1.xml",
            "ppt/slides/slide4.xml",
            "ppt/media/image1.png",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
        // the MACD chart failed to render, so only one image is embedded
        assert!(!names.iter().any(|n| n == "ppt/media/image2.png"));

        let cover = read_entry(&mut archive, "ppt/slides/slide1.xml");
        assert!(cover.contains("Stock Report - AT&amp;T"));

        let missing_chart = read_entry(&mut archive, "ppt/slides/slide3.xml");
        assert!(missing_chart.contains("Chart image not available"));

        let table = read_entry(&mut archive, "ppt/slides/slide4.xml");
        assert!(table.contains("<a:t>2023-01-10</a:t>"));
    }

    #[test]
    fn rendered_charts_are_embedded_as_png() {
        use crate::charts::{macd_figure, main_figure, ChartOptions, StaticChartRenderer};

        let snap = snapshot();
        let main = main_figure(&snap.series, &snap.rendered.chart, &snap.indicators, &ChartOptions::default());
        let main_png = StaticChartRenderer::render_png_bytes(&main, 400, 240).unwrap();
        let macd_png = StaticChartRenderer::render_png_bytes(
            &macd_figure(&snap.series, &snap.indicators),
            400,
            200,
        )
        .unwrap();

        let slides = ReportGenerator::slides_for(&snap, "now", Some(main_png), Some(Some(macd_png)));
        let cursor = ReportGenerator::write_pptx(Cursor::new(Vec::new()), "Stock Report", &slides).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();

        for name in ["ppt/media/image1.png", "ppt/media/image2.png"] {
            let mut bytes = Vec::new();
            archive.by_name(name).unwrap().read_to_end(&mut bytes).unwrap();
            assert!(bytes.starts_with(b"\x89PNG"), "{name} is not a PNG");
        }
        let rels = read_entry(&mut archive, "ppt/slides/_rels/slide3.xml.rels");
        assert!(rels.contains("../media/image2.png"));
    }

    #[test]
    fn empty_deck_is_an_error() {
        let err = ReportGenerator::write_pptx(Cursor::new(Vec::new()), "x", &[]).unwrap_err();
        assert!(matches!(err, ReportError::Empty));
    }
}
