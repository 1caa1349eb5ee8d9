/*!
# Activity Dashboard

A reporting dashboard over a sheet of teacher and student activity submissions, built
in Rust.

## Overview

Each row of the sheet records one activity: who took part, what it was, its level and
format, when it ran, up to six attachment links and the training hours claimed. The
dashboard retrieves the whole sheet, lets the user narrow it with a search form, and
reports on the matching subset with a summary, frequency charts and three exports.

## Architecture

### Pipeline
- **Raw Store** (`dataset`) - The sheet minus its header row, kept as loaded
- **Record Model** (`record`, `dates`) - Named fields over positional rows and an
  explicit-offset date parser
- **Filter Engine** (`filter`) - Conjunctive, case-insensitive matching with an
  inclusive date window, followed by a stable sort on start date
- **Aggregation Engine** (`aggregate`, `graph`) - Counts, hour totals and per-field
  frequency tables, rendered as pie charts
- **Session** (`session`, `commands`) - Search, clear and export as commands over one
  owned state

### Exports
- `downloader` - UTF-8 CSV with a byte-order mark
- `pdf` - Paginated landscape table and single-record page layouts
- `attachment`, `detail`, `thumbnails`, `raster` - Detail view with Drive thumbnails,
  rasterized for the single-record page

### Service
- `loader` - Dataset retrieval that degrades to an empty sheet
- `app` - axum routes for the browser front end
- `config` - Command line and environment settings

The network, rendering and HTTP parts sit behind the `web` feature.
*/

pub mod aggregate;
pub mod attachment;
pub mod commands;
pub mod config;
pub mod dataset;
pub mod dates;
pub mod detail;
pub mod downloader;
pub mod error;
pub mod filter;
pub mod graph;
pub mod loader;
pub mod pdf;
pub mod record;
pub mod session;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod raster;
#[cfg(feature = "web")]
pub mod thumbnails;
