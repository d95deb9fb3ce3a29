//! The single `GET /` page.
//!
//! The page shows whatever the import left in the database. Query failures
//! are logged and rendered as an empty page; they never change the status
//! code.

use std::{fmt::Write as _, net::SocketAddr};

use anyhow::{Context, Result};
use axum::{Router, extract::State, response::Html, routing::get};
use log::{info, warn};
use sqlx::PgPool;

use crate::table::{escape_html, render_table};

const COURSE_LIMIT: i64 = 500;

#[derive(Clone)]
pub struct AppState {
    pool: PgPool,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub courses: i64,
    pub statistics: i64,
    pub admissions: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CourseLine {
    pub id: String,
    pub title: Option<String>,
    pub etcs: Option<String>,
    pub passrate: Option<f32>,
    pub mean: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageData {
    pub counts: Option<TableCounts>,
    pub courses: Vec<CourseLine>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new().route("/", get(index)).with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Binding {addr}"))?;
    info!("Serving course catalog at http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Serving HTTP")?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Listening for Ctrl-C failed: {err}");
    }
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let data = match load_page_data(&state.pool).await {
        Ok(data) => data,
        Err(err) => {
            warn!("Loading page data failed: {err}");
            PageData::default()
        }
    };
    Html(render_page(&data))
}

async fn load_page_data(pool: &PgPool) -> Result<PageData, sqlx::Error> {
    let (courses, statistics, admissions) = sqlx::query_as::<_, (i64, i64, i64)>(
        "SELECT (SELECT COUNT(*) FROM courses), \
                (SELECT COUNT(*) FROM statistics), \
                (SELECT COUNT(*) FROM admissions)",
    )
    .fetch_one(pool)
    .await?;

    let lines = sqlx::query_as::<_, (String, Option<String>, Option<String>, Option<f32>, Option<f32>)>(
        "SELECT c.id, c.title, c.etcs, s.passrate, s.mean \
         FROM courses c LEFT JOIN statistics s ON s.id = c.id \
         ORDER BY c.id LIMIT $1",
    )
    .bind(COURSE_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(PageData {
        counts: Some(TableCounts {
            courses,
            statistics,
            admissions,
        }),
        courses: lines
            .into_iter()
            .map(|(id, title, etcs, passrate, mean)| CourseLine {
                id,
                title,
                etcs,
                passrate,
                mean,
            })
            .collect(),
    })
}

pub fn render_page(data: &PageData) -> String {
    let mut body = String::new();
    match data.counts {
        Some(counts) => {
            let _ = writeln!(
                body,
                "<p>{} courses, {} with statistics, {} admission programs.</p>",
                counts.courses, counts.statistics, counts.admissions
            );
        }
        None => body.push_str("<p>No data available.</p>\n"),
    }
    if !data.courses.is_empty() {
        let rows = data
            .courses
            .iter()
            .map(|line| {
                vec![
                    line.id.clone(),
                    line.title.clone().unwrap_or_default(),
                    line.etcs.clone().unwrap_or_default(),
                    format_metric(line.passrate),
                    format_metric(line.mean),
                ]
            })
            .collect::<Vec<_>>();
        body.push_str(&render_table(
            &["Course", "Title", "ECTS", "Pass rate", "Mean grade"],
            &rows,
        ));
    }
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n{body}</body>\n</html>\n",
        title = escape_html("Course catalog"),
    )
}

fn format_metric(value: Option<f32>) -> String {
    value.map(|v| format!("{v:.1}")).unwrap_or_default()
}
