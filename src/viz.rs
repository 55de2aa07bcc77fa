//! Chart rendering with Plotters. Consumes only the age distribution and the
//! per-group favorite counts.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use tracing::{info, warn};

use crate::age::{AgeDistribution, AgeGroup};
use crate::summary::CategoryPreference;

/// Color palette, one entry per age group in reporting order
const GROUP_COLORS: [RGBColor; 4] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(127, 127, 127),
];

fn group_color(age_group: AgeGroup) -> RGBColor {
    let idx = AgeGroup::ALL
        .iter()
        .position(|g| *g == age_group)
        .unwrap_or(GROUP_COLORS.len() - 1);
    GROUP_COLORS[idx]
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub percentage: f64,
    pub color: RGBColor,
}

/// Slices for every group with at least one customer
pub fn pie_slices(distribution: &AgeDistribution) -> Vec<PieSlice> {
    distribution
        .shares
        .iter()
        .filter(|share| share.count > 0)
        .map(|share| PieSlice {
            label: share.age_group.label().to_string(),
            percentage: share.percentage,
            color: group_color(share.age_group),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBar {
    pub age_group: AgeGroup,
    pub category: String,
    pub count: u32,
}

/// One bar per group whose favorite category is a real value
pub fn category_bars(favorite_counts: &BTreeMap<AgeGroup, CategoryPreference>) -> Vec<CategoryBar> {
    favorite_counts
        .iter()
        .filter(|(_, pref)| !pref.is_no_data())
        .map(|(group, pref)| CategoryBar {
            age_group: *group,
            category: pref.category.clone(),
            count: u32::try_from(pref.count).unwrap_or(u32::MAX),
        })
        .collect()
}

/// Output paths for the pie chart and the bar chart
pub fn chart_paths(base_output_path: &Path) -> (PathBuf, PathBuf) {
    let stem = base_output_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("age_groups");
    let bars = base_output_path.with_file_name(format!("{}_top_categories.png", stem));
    (base_output_path.to_path_buf(), bars)
}

/// Draw a pie chart of the age group distribution
///
/// # Returns
/// * `false` without touching `output_path` when there is nothing to draw
pub fn create_age_distribution_chart(
    distribution: &AgeDistribution,
    output_path: &Path,
) -> crate::Result<bool> {
    let slices = pie_slices(distribution);
    if slices.is_empty() {
        warn!("no customers, skipping age distribution chart");
        return Ok(false);
    }

    let sizes: Vec<f64> = slices.iter().map(|s| s.percentage).collect();
    let colors: Vec<RGBColor> = slices.iter().map(|s| s.color).collect();
    let labels: Vec<&str> = slices.iter().map(|s| s.label.as_str()).collect();

    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let area = root.titled("Age Group Distribution", ("sans-serif", 30))?;

    let dims = area.dim_in_pixel();
    let center = (dims.0 as i32 / 2, dims.1 as i32 / 2);
    let radius = f64::from(dims.0.min(dims.1)) * 0.35;

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(-90.0);
    pie.label_style(("sans-serif", 16).into_font().color(&BLACK));
    pie.percentages(("sans-serif", 14).into_font().color(&WHITE));
    area.draw(&pie)?;

    root.present()?;
    info!(path = %output_path.display(), "age distribution chart saved");

    Ok(true)
}

/// Draw a bar chart of the favorite category count per age group
pub fn create_top_category_chart(
    favorite_counts: &BTreeMap<AgeGroup, CategoryPreference>,
    output_path: &Path,
) -> crate::Result<bool> {
    let bars = category_bars(favorite_counts);
    if bars.is_empty() {
        warn!("no favorite categories, skipping top category chart");
        return Ok(false);
    }

    let max_count = bars.iter().map(|b| b.count).max().unwrap_or(1);
    let y_max = (f64::from(max_count) * 1.2).ceil() as u32 + 1;
    let n_bars = bars.len() as u32;

    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Most Popular Favorite Category by Age Group", ("sans-serif", 26))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..n_bars).into_segmented(), 0u32..y_max)?;

    let group_label = |value: &SegmentValue<u32>| match value {
        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => bars
            .get(*i as usize)
            .map(|bar| bar.age_group.label().to_string())
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Age Group")
        .y_desc("Number of Customers")
        .x_label_formatter(&group_label)
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(i, bar)| {
        let i = i as u32;
        let mut rect = Rectangle::new(
            [(SegmentValue::Exact(i), 0), (SegmentValue::Exact(i + 1), bar.count)],
            group_color(bar.age_group).filled(),
        );
        rect.set_margin(0, 0, 20, 20);
        rect
    }))?;

    chart.draw_series(bars.iter().enumerate().map(|(i, bar)| {
        Text::new(
            format!("{} ({})", bar.category, bar.count),
            (SegmentValue::CenterOf(i as u32), bar.count),
            ("sans-serif", 14).into_font(),
        )
    }))?;

    root.present()?;
    info!(path = %output_path.display(), "top category chart saved");

    Ok(true)
}

/// Write both charts next to `base_output_path`, returning the files drawn
pub fn generate_charts(
    distribution: &AgeDistribution,
    favorite_counts: &BTreeMap<AgeGroup, CategoryPreference>,
    base_output_path: &Path,
) -> crate::Result<Vec<PathBuf>> {
    let (pie_path, bar_path) = chart_paths(base_output_path);
    let mut written = Vec::new();

    if create_age_distribution_chart(distribution, &pie_path)? {
        written.push(pie_path);
    }
    if create_top_category_chart(favorite_counts, &bar_path)? {
        written.push(bar_path);
    }

    Ok(written)
}
