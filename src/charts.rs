// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! ECharts rendering of a [`Dashboard`].
//!
//! Two charts are produced:
//! - **Ingresos vs Gastos**: income and expense bars for the six trailing months
//! - **Gastos por categoría**: doughnut of the current month's expenses
//!
//! Each chart is serialized to its ECharts option JSON and embedded in a
//! standalone HTML page that loads ECharts from a CDN.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisLabel, AxisPointer, AxisPointerType, AxisType, Color, JsFunction, Tooltip, Trigger},
    series::{Bar, Pie},
};

use crate::aggregate::Dashboard;

const ECHARTS_CDN: &str = "https://cdn.jsdelivr.net/npm/echarts@5/dist/echarts.min.js";

const INCOME_COLOR: &str = "#2a9d9d";
const EXPENSE_COLOR: &str = "#e53e3e";

const CATEGORY_COLORS: [&str; 8] = [
    "#1a7a7a", "#2a9d9d", "#3bbfbf", "#4cdbdb", "#e53e3e", "#f56565", "#fc8181", "#fed7d7",
];

/// A chart and the id of the element it is drawn into.
pub struct DashboardChart {
    pub id: &'static str,
    pub chart: Chart,
}

fn thousands_formatter() -> JsFunction {
    JsFunction::new_with_args("value", "return '$' + value / 1000 + 'k';")
}

fn money_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "value",
        "return '$' + Math.round(value).toString().replace(/\\B(?=(\\d{3})+(?!\\d))/g, '.');",
    )
}

pub fn series_chart(dashboard: &Dashboard) -> Chart {
    let labels: Vec<String> = dashboard.series.iter().map(|b| b.label.clone()).collect();
    // Chart values are display-only, the totals themselves stay integral.
    let income: Vec<f64> = dashboard.series.iter().map(|b| b.income as f64).collect();
    let expense: Vec<f64> = dashboard.series.iter().map(|b| b.expense as f64).collect();

    Chart::new()
        .title(Title::new().text("Ingresos vs Gastos").subtext("Últimos 6 meses"))
        .color(vec![Color::from(INCOME_COLOR), Color::from(EXPENSE_COLOR)])
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .value_formatter(money_formatter())
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .legend(Legend::new().bottom("0"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("10%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(thousands_formatter())),
        )
        .series(Bar::new().name("Ingresos").data(income))
        .series(Bar::new().name("Gastos").data(expense))
}

pub fn category_chart(dashboard: &Dashboard) -> Chart {
    let data: Vec<(f64, &str)> = dashboard
        .categories
        .iter()
        .map(|c| (c.amount as f64, c.category.as_str()))
        .collect();

    Chart::new()
        .title(Title::new().text("Gastos por categoría").subtext("Este mes"))
        .color(CATEGORY_COLORS.iter().map(|c| Color::from(*c)).collect())
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(money_formatter()),
        )
        .legend(Legend::new().bottom("0"))
        .series(
            Pie::new()
                .name("Gastos")
                .radius(vec!["45%", "60%"])
                .data(data),
        )
}

pub fn dashboard_charts(dashboard: &Dashboard) -> Vec<DashboardChart> {
    let mut charts = vec![DashboardChart {
        id: "series-chart",
        chart: series_chart(dashboard),
    }];
    if !dashboard.categories.is_empty() {
        charts.push(DashboardChart {
            id: "category-chart",
            chart: category_chart(dashboard),
        });
    }
    charts
}

/// A standalone HTML page drawing `charts`.
pub fn render_html(title: &str, charts: &[DashboardChart]) -> String {
    let containers = charts
        .iter()
        .map(|c| {
            format!(
                r#"<div id="{}" style="width: 100%; min-height: 380px; margin-bottom: 24px;"></div>"#,
                c.id
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let scripts = charts
        .iter()
        .map(|c| {
            format!(
                r#"(function() {{
    const chart = echarts.init(document.getElementById("{}"));
    chart.setOption({});
    window.addEventListener('resize', chart.resize);
}})();"#,
                c.id, c.chart
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{cdn}"></script>
</head>
<body style="font-family: sans-serif; max-width: 960px; margin: 0 auto; padding: 16px;">
<h1>{title}</h1>
{containers}
<script>
{scripts}
</script>
</body>
</html>
"#,
        title = title,
        cdn = ECHARTS_CDN,
        containers = containers,
        scripts = scripts,
    )
}
