//! # 流程图绘制
//!
//! 使用 `plotters` 库将流程图绘制为图片。
//!
//! ## 功能
//! - 单元绘制为带名称的圆
//! - 物流绘制为带箭头的线段，标签标注在中点
//! - 循环物流（回边）与信号流使用不同颜色
//! - 支持 PNG 和 SVG 输出
//!
//! ## 依赖关系
//! - 被 `commands/render.rs` 调用
//! - 使用 `render/layout.rs` 计算坐标
//! - 使用 `plotters` 渲染图表

use super::layout::{layered_layout, Layout};
use crate::error::{Result, SfilesError};
use crate::models::{Flowsheet, StreamKind};

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontStyle;
use std::path::Path;

/// 单元圆半径（像素）
const NODE_RADIUS: i32 = 34;

const NODE_COLOR: RGBColor = RGBColor(173, 216, 230);
const STREAM_COLOR: RGBColor = RGBColor(128, 128, 128);
const RECYCLE_COLOR: RGBColor = RGBColor(230, 126, 34);
const SIGNAL_COLOR: RGBColor = RGBColor(0, 102, 204);

/// 绘图参数
#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub use_svg: bool,
}

impl Default for PlotOptions {
    fn default() -> Self {
        PlotOptions {
            title: "Current Flowsheet Graph".to_string(),
            width: 1200,
            height: 800,
            use_svg: false,
        }
    }
}

/// 生成流程图图片
pub fn generate_flowsheet_plot(
    flowsheet: &Flowsheet,
    output_path: &Path,
    options: &PlotOptions,
) -> Result<()> {
    let layout = layered_layout(flowsheet);
    tracing::debug!(
        units = flowsheet.unit_count(),
        layers = layout.layer_count(),
        path = %output_path.display(),
        "rendering flowsheet"
    );

    if options.use_svg {
        let root = SVGBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        draw_flowsheet(&root, flowsheet, &layout, options)?;
        root.present()
            .map_err(|e| SfilesError::RenderError(format!("{:?}", e)))?;
    } else {
        let root =
            BitMapBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        draw_flowsheet(&root, flowsheet, &layout, options)?;
        root.present()
            .map_err(|e| SfilesError::RenderError(format!("{:?}", e)))?;
    }
    Ok(())
}

/// 绘制流程图的核心逻辑
fn draw_flowsheet<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    flowsheet: &Flowsheet,
    layout: &Layout,
    options: &PlotOptions,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| SfilesError::RenderError(format!("{:?}", e)))?;

    let mut chart = ChartBuilder::on(root)
        .caption(&options.title, ("sans-serif", 28).into_font())
        .margin(30)
        .build_cartesian_2d(0.0..1.0, 0.0..1.0)
        .map_err(|e| SfilesError::RenderError(format!("{:?}", e)))?;

    if flowsheet.is_empty() {
        chart
            .draw_series(std::iter::once(Text::new(
                "Empty flowsheet",
                (0.5, 0.5),
                ("sans-serif", 20)
                    .into_font()
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Center, VPos::Center)),
            )))
            .map_err(|e| SfilesError::RenderError(format!("{:?}", e)))?;
        return Ok(());
    }

    // 数据坐标中一个像素的大小
    let (px_w, px_h) = chart.plotting_area().dim_in_pixel();
    let scale = (1.0 / px_w.max(1) as f64, 1.0 / px_h.max(1) as f64);

    // ─────────────────────────────────────────────────────────────
    // 物流
    // ─────────────────────────────────────────────────────────────
    for stream in flowsheet.streams() {
        let (Some(&from), Some(&to)) = (
            layout.positions.get(&stream.from),
            layout.positions.get(&stream.to),
        ) else {
            continue;
        };

        let color = match stream.kind {
            StreamKind::Signal => SIGNAL_COLOR,
            StreamKind::Material if layout.is_back_edge(&stream.from, &stream.to) => RECYCLE_COLOR,
            StreamKind::Material => STREAM_COLOR,
        };

        // 反向物流存在时两条线错开
        let offset = if flowsheet.stream(&stream.to, &stream.from).is_some() {
            8.0
        } else {
            0.0
        };

        let geometry = StreamGeometry::new(from, to, scale, offset);
        let width = if stream.is_signal() { 1 } else { 2 };

        let segments = if stream.is_signal() {
            geometry.dashes()
        } else {
            vec![(geometry.start, geometry.end)]
        };
        chart
            .draw_series(
                segments
                    .into_iter()
                    .map(|(a, b)| PathElement::new(vec![a, b], color.stroke_width(width))),
            )
            .map_err(|e| SfilesError::RenderError(format!("{:?}", e)))?;

        chart
            .draw_series(std::iter::once(Polygon::new(
                geometry.arrow_head(),
                color.filled(),
            )))
            .map_err(|e| SfilesError::RenderError(format!("{:?}", e)))?;

        if !stream.tags.is_empty() {
            chart
                .draw_series(std::iter::once(Text::new(
                    stream.tags.to_string(),
                    geometry.midpoint(),
                    ("sans-serif", 13)
                        .into_font()
                        .color(&BLACK)
                        .pos(Pos::new(HPos::Center, VPos::Bottom)),
                )))
                .map_err(|e| SfilesError::RenderError(format!("{:?}", e)))?;
        }
    }

    // ─────────────────────────────────────────────────────────────
    // 单元
    // ─────────────────────────────────────────────────────────────
    for (name, &(x, y)) in &layout.positions {
        chart
            .draw_series(std::iter::once(Circle::new(
                (x, y),
                NODE_RADIUS,
                NODE_COLOR.filled(),
            )))
            .map_err(|e| SfilesError::RenderError(format!("{:?}", e)))?;

        chart
            .draw_series(std::iter::once(Text::new(
                name.clone(),
                (x, y),
                ("sans-serif", 14)
                    .into_font()
                    .style(FontStyle::Bold)
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Center, VPos::Center)),
            )))
            .map_err(|e| SfilesError::RenderError(format!("{:?}", e)))?;
    }

    Ok(())
}

/// 物流线段几何（数据坐标）
struct StreamGeometry {
    start: (f64, f64),
    end: (f64, f64),
    /// 沿线方向的单位向量（像素空间）
    dir: (f64, f64),
    scale: (f64, f64),
}

impl StreamGeometry {
    /// 起止点各缩进一个单元半径；`offset` 为垂直方向错开的像素数
    fn new(from: (f64, f64), to: (f64, f64), scale: (f64, f64), offset: f64) -> Self {
        let dx = (to.0 - from.0) / scale.0;
        let dy = (to.1 - from.1) / scale.1;
        let len = (dx * dx + dy * dy).sqrt().max(1e-9);
        let dir = (dx / len, dy / len);
        let normal = (-dir.1, dir.0);

        let r = NODE_RADIUS as f64;
        let shift = |p: (f64, f64), along: f64| {
            (
                p.0 + (dir.0 * along + normal.0 * offset) * scale.0,
                p.1 + (dir.1 * along + normal.1 * offset) * scale.1,
            )
        };

        StreamGeometry {
            start: shift(from, r),
            end: shift(to, -r),
            dir,
            scale,
        }
    }

    fn midpoint(&self) -> (f64, f64) {
        (
            (self.start.0 + self.end.0) / 2.0,
            (self.start.1 + self.end.1) / 2.0,
        )
    }

    /// 虚线分段（像素长度 8 实 / 5 空）
    fn dashes(&self) -> Vec<((f64, f64), (f64, f64))> {
        let (dash, gap) = (8.0, 5.0);
        let dx = (self.end.0 - self.start.0) / self.scale.0;
        let dy = (self.end.1 - self.start.1) / self.scale.1;
        let total = (dx * dx + dy * dy).sqrt();

        let at = |d: f64| {
            (
                self.start.0 + self.dir.0 * d * self.scale.0,
                self.start.1 + self.dir.1 * d * self.scale.1,
            )
        };

        let mut segments = Vec::new();
        let mut d = 0.0;
        while d < total {
            segments.push((at(d), at((d + dash).min(total))));
            d += dash + gap;
        }
        segments
    }

    /// 终点处的三角形箭头
    fn arrow_head(&self) -> Vec<(f64, f64)> {
        let (length, half_width) = (14.0, 6.0);
        let normal = (-self.dir.1, self.dir.0);
        let base = (
            self.end.0 - self.dir.0 * length * self.scale.0,
            self.end.1 - self.dir.1 * length * self.scale.1,
        );

        vec![
            self.end,
            (
                base.0 + normal.0 * half_width * self.scale.0,
                base.1 + normal.1 * half_width * self.scale.1,
            ),
            (
                base.0 - normal.0 * half_width * self.scale.0,
                base.1 - normal.1 * half_width * self.scale.1,
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Flowsheet {
        Flowsheet::from_sfiles("(raw)(mix)<1(r){not_next_unitop}_2(splt)1(prod)n|(C)<_2").unwrap()
    }

    #[test]
    fn test_render_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plant.png");
        let options = PlotOptions {
            width: 600,
            height: 400,
            ..PlotOptions::default()
        };

        generate_flowsheet_plot(&sample(), &path, &options).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn test_render_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plant.svg");
        let options = PlotOptions {
            use_svg: true,
            ..PlotOptions::default()
        };

        generate_flowsheet_plot(&sample(), &path, &options).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("<circle"));
    }

    #[test]
    fn test_stream_geometry_shortens_line() {
        let scale = (0.001, 0.001);
        let g = StreamGeometry::new((0.0, 0.5), (1.0, 0.5), scale, 0.0);
        let r = NODE_RADIUS as f64 * scale.0;

        assert!((g.start.0 - r).abs() < 1e-9);
        assert!((g.end.0 - (1.0 - r)).abs() < 1e-9);
        assert!((g.start.1 - 0.5).abs() < 1e-9);
        assert!((g.midpoint().0 - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_arrow_head_points_at_end() {
        let g = StreamGeometry::new((0.0, 0.0), (1.0, 0.0), (0.001, 0.001), 0.0);
        let head = g.arrow_head();
        assert_eq!(head.len(), 3);
        assert_eq!(head[0], g.end);
        assert!(head[1].0 < g.end.0);
        assert!((head[1].1 + head[2].1).abs() < 1e-9);
    }

    #[test]
    fn test_dashes_cover_line() {
        let g = StreamGeometry::new((0.0, 0.5), (1.0, 0.5), (0.001, 0.001), 0.0);
        let dashes = g.dashes();
        assert!(dashes.len() > 10);
        assert_eq!(dashes[0].0, g.start);
        let last = dashes[dashes.len() - 1].1;
        assert!(last.0 <= g.end.0 + 1e-9);
    }

    #[test]
    fn test_offset_separates_opposite_streams() {
        let scale = (0.001, 0.001);
        let ab = StreamGeometry::new((0.0, 0.5), (1.0, 0.5), scale, 8.0);
        let ba = StreamGeometry::new((1.0, 0.5), (0.0, 0.5), scale, 8.0);
        assert!((ab.start.1 - ba.end.1).abs() > 1e-6);
    }
}
