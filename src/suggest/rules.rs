//! Suggestion heuristics

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::profile::{profile_columns, ColumnProfile};
use crate::query::ColumnSelection;
use crate::result::{ChartData, ChartSeries, QueryResult};

/// Most categories a bar chart is suggested for
pub const MAX_BAR_CATEGORIES: usize = 20;

/// Most slices a pie chart is suggested for
pub const MAX_PIE_SLICES: usize = 7;

/// Bars turn horizontal above this many categories
const HORIZONTAL_BAR_THRESHOLD: usize = 10;

/// Pie charts become donuts at or below this many slices
const DONUT_THRESHOLD: usize = 5;

/// Line charts show point markers at or below this many rows
const LINE_POINTS_THRESHOLD: usize = 20;

/// Scatter plots need at least this many rows
const MIN_SCATTER_ROWS: usize = 5;

/// Kind of visualization
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    /// A single big number
    Metric,
    Line,
    Area,
    Bar,
    Pie,
    Donut,
    Scatter,
}

impl std::fmt::Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Metric => "metric",
            Self::Line => "line",
            Self::Area => "area",
            Self::Bar => "bar",
            Self::Pie => "pie",
            Self::Donut => "donut",
            Self::Scatter => "scatter",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// Pre-filled chart configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    /// Category or x-axis column
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis: Option<String>,
    /// Measure columns
    #[serde(default)]
    pub y_axis: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    #[serde(default)]
    pub stacked: bool,
    #[serde(default)]
    pub show_points: bool,
    /// Bubble size column (scatter only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

/// A ranked visualization proposal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartSuggestion {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    /// In `[0, 1]`
    pub confidence: f64,
    pub reason: String,
    pub config: ChartConfig,
}

impl ChartSuggestion {
    fn new(chart_type: ChartType, confidence: f64, reason: impl Into<String>, config: ChartConfig) -> Self {
        Self {
            chart_type,
            confidence,
            reason: reason.into(),
            config,
        }
    }

    /// Series data for this suggestion's axes
    ///
    /// Metrics have no category axis; their single value becomes one series
    /// with one unnamed category.
    pub fn chart_data(&self, result: &QueryResult) -> ChartData {
        let values: Vec<&str> = self.config.y_axis.iter().map(String::as_str).collect();
        match &self.config.x_axis {
            Some(x) => ChartData::from_result(result, x, &values),
            None => {
                let mut data = ChartData::default();
                for name in values {
                    if let Some(idx) = result.column_index(name) {
                        data.series.push(ChartSeries {
                            name: name.to_string(),
                            data: result.column_values(idx).map(|v| v.as_f64()).collect(),
                        });
                    }
                }
                data.categories = vec![String::new(); result.len()];
                data
            }
        }
    }
}

/// Suggest charts for `result`, highest confidence first
pub fn suggest(result: &QueryResult, selections: &[ColumnSelection]) -> Vec<ChartSuggestion> {
    let profiles = profile_columns(result, selections);
    let rows = result.len();

    let numeric: Vec<&ColumnProfile> = profiles.iter().filter(|p| p.is_numeric()).collect();
    let dates: Vec<&ColumnProfile> = profiles.iter().filter(|p| p.is_date()).collect();
    let categorical: Vec<&ColumnProfile> = profiles.iter().filter(|p| p.is_categorical()).collect();
    let measures: Vec<String> = numeric.iter().map(|p| p.name.clone()).collect();

    let mut suggestions = Vec::new();

    if rows == 1 && numeric.len() == 1 {
        suggestions.push(ChartSuggestion::new(
            ChartType::Metric,
            0.95,
            "Single value result",
            ChartConfig {
                y_axis: measures.clone(),
                ..Default::default()
            },
        ));
    }

    if let (Some(date), false) = (dates.first(), numeric.is_empty()) {
        suggestions.push(ChartSuggestion::new(
            ChartType::Line,
            0.90,
            format!("Trend of {} over {}", measures.join(", "), date.name),
            ChartConfig {
                x_axis: Some(date.name.clone()),
                y_axis: measures.clone(),
                show_points: rows <= LINE_POINTS_THRESHOLD,
                ..Default::default()
            },
        ));

        if numeric.len() > 1 {
            suggestions.push(ChartSuggestion::new(
                ChartType::Area,
                0.75,
                format!("Stacked composition over {}", date.name),
                ChartConfig {
                    x_axis: Some(date.name.clone()),
                    y_axis: measures.clone(),
                    stacked: true,
                    ..Default::default()
                },
            ));
        }
    }

    if let (Some(category), false) = (categorical.first(), numeric.is_empty()) {
        let cardinality = category.unique_count;

        if cardinality <= MAX_BAR_CATEGORIES {
            let orientation = if cardinality > HORIZONTAL_BAR_THRESHOLD {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            suggestions.push(ChartSuggestion::new(
                ChartType::Bar,
                0.85,
                format!("Compare {} across {} {} values", measures.join(", "), cardinality, category.name),
                ChartConfig {
                    x_axis: Some(category.name.clone()),
                    y_axis: measures.clone(),
                    orientation: Some(orientation),
                    stacked: numeric.len() > 1,
                    ..Default::default()
                },
            ));
        }

        if cardinality <= MAX_PIE_SLICES && numeric.len() == 1 {
            let chart_type = if cardinality <= DONUT_THRESHOLD {
                ChartType::Donut
            } else {
                ChartType::Pie
            };
            suggestions.push(ChartSuggestion::new(
                chart_type,
                0.80,
                format!("Share of {} by {}", measures.join(", "), category.name),
                ChartConfig {
                    x_axis: Some(category.name.clone()),
                    y_axis: measures.clone(),
                    ..Default::default()
                },
            ));
        }
    }

    if numeric.len() >= 2 && dates.is_empty() && rows >= MIN_SCATTER_ROWS {
        suggestions.push(ChartSuggestion::new(
            ChartType::Scatter,
            0.70,
            format!("Relationship between {} and {}", numeric[0].name, numeric[1].name),
            ChartConfig {
                x_axis: Some(numeric[0].name.clone()),
                y_axis: vec![numeric[1].name.clone()],
                size: numeric.get(2).map(|p| p.name.clone()),
                ..Default::default()
            },
        ));
    }

    let strong_bar = suggestions
        .iter()
        .any(|s| s.chart_type == ChartType::Bar && s.confidence >= 0.85);
    if let Some(category) = categorical.first() {
        if numeric.len() > 1
            && dates.is_empty()
            && profiles.iter().any(|p| p.has_aggregation)
            && !strong_bar
        {
            suggestions.push(ChartSuggestion::new(
                ChartType::Bar,
                0.65,
                format!("Grouped comparison by {}", category.name),
                ChartConfig {
                    x_axis: Some(category.name.clone()),
                    y_axis: measures.clone(),
                    orientation: Some(Orientation::Vertical),
                    ..Default::default()
                },
            ));
        }
    }

    if suggestions.is_empty() && profiles.len() >= 2 {
        suggestions.push(ChartSuggestion::new(
            ChartType::Bar,
            0.50,
            "Default view of the first two columns",
            ChartConfig {
                x_axis: Some(profiles[0].name.clone()),
                y_axis: vec![profiles[1].name.clone()],
                orientation: Some(Orientation::Vertical),
                ..Default::default()
            },
        ));
    }

    // Stable: equal confidences keep rule order
    suggestions.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });

    tracing::debug!(
        columns = profiles.len(),
        rows,
        suggestions = suggestions.len(),
        "Suggested charts"
    );

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::AggregationType;
    use crate::result::CellValue;

    fn result(columns: &[&str], types: &[&str], rows: Vec<Vec<CellValue>>) -> QueryResult {
        QueryResult::new(
            columns.iter().map(|c| c.to_string()).collect(),
            types.iter().map(|t| t.to_string()).collect(),
            rows,
        )
        .unwrap()
    }

    fn types(suggestions: &[ChartSuggestion]) -> Vec<ChartType> {
        suggestions.iter().map(|s| s.chart_type).collect()
    }

    fn categories(n: usize, measures: usize) -> QueryResult {
        let mut columns = vec!["region".to_string()];
        let mut column_types = vec!["text".to_string()];
        for m in 0..measures {
            columns.push(format!("m{}", m));
            column_types.push("integer".to_string());
        }
        let rows = (0..n)
            .map(|i| {
                let mut row = vec![CellValue::Text(format!("r{}", i))];
                row.extend((0..measures).map(|m| CellValue::Number((i * 10 + m) as f64)));
                row
            })
            .collect();
        QueryResult::new(columns, column_types, rows).unwrap()
    }

    #[test]
    fn test_single_value_is_metric() {
        let r = result(&["total"], &["numeric"], vec![vec![CellValue::Number(42.0)]]);
        let suggestions = suggest(&r, &[]);

        assert_eq!(suggestions[0].chart_type, ChartType::Metric);
        assert!(suggestions[0].confidence >= 0.9);
        assert!(suggestions
            .iter()
            .all(|s| s.confidence <= suggestions[0].confidence));
    }

    #[test]
    fn test_metric_outranks_other_single_row_charts() {
        let r = result(
            &["day", "total"],
            &["date", "numeric"],
            vec![vec!["2024-01-01".into(), CellValue::Number(42.0)]],
        );
        let suggestions = suggest(&r, &[]);
        assert_eq!(types(&suggestions), vec![ChartType::Metric, ChartType::Line]);
    }

    #[test]
    fn test_date_and_two_measures_is_line_then_area() {
        let r = result(
            &["day", "revenue", "cost"],
            &["date", "numeric", "numeric"],
            (1..=3)
                .map(|d| {
                    vec![
                        CellValue::Text(format!("2024-01-0{}", d)),
                        CellValue::Number(d as f64),
                        CellValue::Number(1.0),
                    ]
                })
                .collect(),
        );
        let suggestions = suggest(&r, &[]);

        let line = suggestions.iter().find(|s| s.chart_type == ChartType::Line).unwrap();
        let area = suggestions.iter().find(|s| s.chart_type == ChartType::Area).unwrap();
        assert!(line.confidence > area.confidence);
        assert!(line.config.show_points);
        assert!(area.config.stacked);
        assert_eq!(line.config.x_axis.as_deref(), Some("day"));
        assert_eq!(line.config.y_axis, vec!["revenue", "cost"]);
    }

    #[test]
    fn test_long_series_hides_points() {
        let r = result(
            &["day", "n"],
            &["timestamp", "integer"],
            (0..30)
                .map(|i| vec![CellValue::Text(format!("2024-01-{:02}", i + 1)), CellValue::Number(i as f64)])
                .collect(),
        );
        let line = suggest(&r, &[]).into_iter().find(|s| s.chart_type == ChartType::Line).unwrap();
        assert!(!line.config.show_points);
    }

    #[test]
    fn test_few_categories_bar_and_donut() {
        let suggestions = suggest(&categories(4, 1), &[]);
        assert_eq!(types(&suggestions), vec![ChartType::Bar, ChartType::Donut]);
        assert_eq!(suggestions[0].config.orientation, Some(Orientation::Vertical));
        assert!(!suggestions[0].config.stacked);
    }

    #[test]
    fn test_pie_between_donut_and_bar_limits() {
        let suggestions = suggest(&categories(7, 1), &[]);
        assert_eq!(types(&suggestions), vec![ChartType::Bar, ChartType::Pie]);

        let suggestions = suggest(&categories(8, 1), &[]);
        assert_eq!(types(&suggestions), vec![ChartType::Bar]);
    }

    #[test]
    fn test_many_categories_bar_is_horizontal() {
        let suggestions = suggest(&categories(15, 1), &[]);
        assert_eq!(suggestions[0].chart_type, ChartType::Bar);
        assert_eq!(suggestions[0].config.orientation, Some(Orientation::Horizontal));
    }

    #[test]
    fn test_multiple_measures_stack_bars_and_scatter() {
        let suggestions = suggest(&categories(6, 3), &[]);
        assert_eq!(types(&suggestions), vec![ChartType::Bar, ChartType::Scatter]);
        assert!(suggestions[0].config.stacked);

        let scatter = &suggestions[1];
        assert_eq!(scatter.config.x_axis.as_deref(), Some("m0"));
        assert_eq!(scatter.config.y_axis, vec!["m1"]);
        assert_eq!(scatter.config.size.as_deref(), Some("m2"));
    }

    #[test]
    fn test_scatter_needs_rows() {
        let suggestions = suggest(&categories(4, 2), &[]);
        assert!(!types(&suggestions).contains(&ChartType::Scatter));
    }

    #[test]
    fn test_grouped_bar_when_too_many_categories() {
        let r = categories(25, 2);
        let selections = vec![
            ColumnSelection::new("t1", "region"),
            ColumnSelection::new("t1", "m0").aggregate(AggregationType::Sum),
            ColumnSelection::new("t1", "m1").aggregate(AggregationType::Avg),
        ];
        let suggestions = suggest(&r, &selections);
        assert_eq!(types(&suggestions), vec![ChartType::Scatter, ChartType::Bar]);
        assert_eq!(suggestions[1].confidence, 0.65);

        // Without aggregation there is no grouped bar
        let suggestions = suggest(&r, &[]);
        assert_eq!(types(&suggestions), vec![ChartType::Scatter]);
    }

    #[test]
    fn test_fallback_bar() {
        let r = result(
            &["a", "b"],
            &["text", "text"],
            vec![vec!["x".into(), "y".into()]],
        );
        let suggestions = suggest(&r, &[]);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].chart_type, ChartType::Bar);
        assert_eq!(suggestions[0].confidence, 0.50);
        assert_eq!(suggestions[0].config.x_axis.as_deref(), Some("a"));
        assert_eq!(suggestions[0].config.y_axis, vec!["b"]);
    }

    #[test]
    fn test_nothing_to_suggest() {
        let r = result(&["a"], &["text"], vec![vec!["x".into()]]);
        assert!(suggest(&r, &[]).is_empty());
    }

    #[test]
    fn test_sorted_by_confidence() {
        let r = result(
            &["day", "region", "n"],
            &["date", "text", "integer"],
            vec![
                vec!["2024-01-01".into(), "eu".into(), CellValue::Number(1.0)],
                vec!["2024-01-02".into(), "us".into(), CellValue::Number(2.0)],
            ],
        );
        let suggestions = suggest(&r, &[]);
        assert_eq!(
            types(&suggestions),
            vec![ChartType::Line, ChartType::Bar, ChartType::Donut]
        );
        assert!(suggestions
            .windows(2)
            .all(|w| w[0].confidence >= w[1].confidence));
    }

    #[test]
    fn test_chart_data() {
        let r = categories(3, 1);
        let bar = suggest(&r, &[]).remove(0);
        let data = bar.chart_data(&r);
        assert_eq!(data.categories, vec!["r0", "r1", "r2"]);
        assert_eq!(data.series[0].name, "m0");
        assert_eq!(data.series[0].data, vec![Some(0.0), Some(10.0), Some(20.0)]);

        let metric_result = result(&["total"], &["numeric"], vec![vec![CellValue::Number(42.0)]]);
        let metric = suggest(&metric_result, &[]).remove(0);
        let data = metric.chart_data(&metric_result);
        assert_eq!(data.series[0].data, vec![Some(42.0)]);
    }

    #[test]
    fn test_serialized_shape() {
        let suggestions = suggest(&categories(2, 1), &[]);
        let json = serde_json::to_value(&suggestions[0]).unwrap();
        assert_eq!(json["type"], "bar");
        assert_eq!(json["config"]["xAxis"], "region");
        assert_eq!(json["config"]["orientation"], "vertical");
    }
}
