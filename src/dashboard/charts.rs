//! Chart generation and rendering for the dashboard.
//!
//! This module creates interactive ECharts visualizations for financial data:
//! - **Expense Pie Chart**: Spending share per category for the selected period
//! - **Cash Flow Chart**: Income and expense totals over time
//! - **Balance Chart**: Running balance over time
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with corresponding HTML containers and JavaScript initialization
//! code. Goal projections reuse the same machinery via [projection_chart].

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title, VisualMap, VisualMapPiece},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, Color, Emphasis, EmphasisFocus,
        ItemStyle, JsFunction, Label, Tooltip, Trigger,
    },
    series::{Bar, Line, Pie, PieRoseType},
};
use maud::{Markup, PreEscaped, html};

use crate::{
    dashboard::{categories::CategoryBucket, series::TimeSeriesPoint},
    html::HeadElement,
};

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(crate) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the HTML containers for dashboard charts.
pub(crate) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing.
pub(crate) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

/// A doughnut chart of spending per category.
///
/// Slices use the colors already assigned to the buckets so that the chart
/// agrees with the category tables elsewhere in the app.
pub(crate) fn expense_pie_chart(subtitle: &str, expense_buckets: &[CategoryBucket]) -> Chart {
    let colors: Vec<Color> = expense_buckets
        .iter()
        .map(|bucket| bucket.color.into())
        .collect();
    let data: Vec<(f64, &str)> = expense_buckets
        .iter()
        .map(|bucket| (bucket.total, bucket.category.as_str()))
        .collect();

    Chart::new()
        .title(Title::new().text("Spending by category").subtext(subtitle))
        .color(colors)
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .series(
            Pie::new()
                .name("Expenses")
                .rose_type(PieRoseType::Radius)
                .radius(vec!["30%", "70%"])
                .center(vec!["50%", "55%"])
                .label(Label::new().show(true).formatter("{b}: {d}%"))
                .item_style(ItemStyle::new().border_radius(4))
                .data(data),
        )
}

/// A bar chart with income and expense totals side by side per time bucket.
pub(crate) fn cash_flow_chart(subtitle: &str, points: &[TimeSeriesPoint]) -> Chart {
    let labels: Vec<String> = points.iter().map(|point| point.label.clone()).collect();
    let income: Vec<f64> = points.iter().map(|point| point.income).collect();
    let expense: Vec<f64> = points.iter().map(|point| point.expense).collect();

    Chart::new()
        .title(Title::new().text("Cash flow").subtext(subtitle))
        .color::<Color>(vec!["#10b981".into(), "#f43f5e".into()])
        .tooltip(currency_tooltip())
        .legend(Legend::new().top("6%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(
            Bar::new()
                .name("Income")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(income),
        )
        .series(
            Bar::new()
                .name("Expenses")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(expense),
        )
}

/// A line chart of the running balance, red below zero and green above.
pub(crate) fn balance_chart(subtitle: &str, points: &[TimeSeriesPoint]) -> Chart {
    let labels: Vec<String> = points.iter().map(|point| point.label.clone()).collect();
    let balances: Vec<f64> = points.iter().map(|point| point.balance).collect();

    Chart::new()
        .title(Title::new().text("Balance").subtext(subtitle))
        .tooltip(currency_tooltip())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .visual_map(VisualMap::new().show(false).pieces(vec![
            VisualMapPiece::new().lte(-1).color("red"),
            VisualMapPiece::new().gte(0).color("green"),
        ]))
        .series(Line::new().name("Balance").data(balances))
}

/// A line chart of projected savings growth, used on the goals page.
pub(crate) fn projection_chart(labels: Vec<String>, totals: Vec<f64>) -> Chart {
    Chart::new()
        .title(
            Title::new()
                .text("Projected savings")
                .subtext("Next twelve months"),
        )
        .tooltip(currency_tooltip())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Line::new().name("Savings").data(totals))
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
