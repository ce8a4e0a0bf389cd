//! `homedash show <source>` — fetch one source and render its items.

use chrono::Utc;
use tabled::Tabled;

use homedash_core::adapter::{BucketedRequest, LibraryData, SeriesData};
use homedash_core::model::{
    CalendarEvent, ContainerSummary, DownloadItem, FeedItem, MarketQuote, MediaItem, SystemSample,
};
use homedash_core::units::{format_bytes, format_duration_secs, format_rate_bps, format_relative};
use homedash_core::{CoreError, Engine, SourceData, SourceId};

use crate::cli::{GlobalOpts, OutputFormat, ShowArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(engine: &Engine, args: ShowArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let id = SourceId::from(args.source.as_str());
    engine
        .oneshot_source(&id)
        .await
        .map_err(|e| match e {
            CoreError::SourceNotFound { .. } => CliError::UnknownSource {
                source_id: args.source.clone(),
            },
            other => other.into(),
        })?;

    let state = engine.get(&id).ok_or_else(|| CliError::UnknownSource {
        source_id: args.source.clone(),
    })?;

    if let Some(err) = &state.last_error {
        return Err(CoreError::Fetch {
            message: err.message.clone(),
            kind: err.kind,
        }
        .into());
    }

    if let Some(data) = state.data.as_ref() {
        render(data, global);
    }
    Ok(())
}

fn render(data: &SourceData, global: &GlobalOpts) {
    let out = match data {
        SourceData::Requests(requests) => render_requests(requests, &global.output),
        SourceData::Library(lib) => render_library(lib, &global.output),
        SourceData::Series(series) => render_series(series, &global.output),
        SourceData::Containers(containers) => render_containers(containers, &global.output),
        SourceData::Downloads(items) => render_downloads(items, &global.output),
        SourceData::System(sample) => render_system(sample, &global.output),
        SourceData::Calendar(events) => render_calendar(events, &global.output),
        SourceData::Feed(items) => render_feed(items, &global.output),
        SourceData::Markets(quotes) => render_markets(quotes, &global.output),
        _ => return,
    };
    output::print_output(&out, global.quiet);
}

// ── Requests ────────────────────────────────────────────────────────

#[derive(Tabled)]
struct RequestRow {
    #[tabled(rename = "Bucket")]
    bucket: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Requested by")]
    requested_by: String,
}

fn render_requests(requests: &[BucketedRequest], format: &OutputFormat) -> String {
    output::render_list(
        format,
        requests,
        |r| RequestRow {
            bucket: r.bucket.to_string(),
            title: r.item.title.clone(),
            status: r.item.status.to_string(),
            requested_by: r.item.requested_by.clone().unwrap_or_default(),
        },
        |r| r.item.id.clone(),
    )
}

// ── Media libraries ─────────────────────────────────────────────────

#[derive(Tabled)]
struct MediaRow {
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Added")]
    added: String,
}

fn media_row(item: &MediaItem) -> MediaRow {
    let now = Utc::now();
    MediaRow {
        title: match (&item.subtitle, item.year) {
            (Some(sub), _) => format!("{}: {sub}", item.title),
            (None, Some(year)) => format!("{} ({year})", item.title),
            (None, None) => item.title.clone(),
        },
        status: item.status.to_string(),
        added: item
            .added_at
            .map(|t| format_relative(t, now))
            .unwrap_or_default(),
    }
}

fn render_library(lib: &LibraryData, format: &OutputFormat) -> String {
    if matches!(format, OutputFormat::Table) {
        let recent = output::render_list(format, &lib.recent, media_row, |i| i.id.clone());
        let missing = output::render_list(format, &lib.missing, media_row, |i| i.id.clone());
        format!("Recently added\n{recent}\n\nMissing\n{missing}")
    } else {
        output::render_list(format, std::slice::from_ref(lib), |_| EmptyRow {}, |_| {
            String::new()
        })
    }
}

fn render_series(series: &SeriesData, format: &OutputFormat) -> String {
    if matches!(format, OutputFormat::Table) {
        let recent = output::render_list(format, &series.recent, media_row, |i| i.id.clone());
        let upcoming = output::render_list(format, &series.upcoming, media_row, |i| i.id.clone());
        format!("Recent episodes\n{recent}\n\nUpcoming / wanted\n{upcoming}")
    } else {
        output::render_list(format, std::slice::from_ref(series), |_| EmptyRow {}, |_| {
            String::new()
        })
    }
}

/// Placeholder row for structured formats where no table is built.
#[derive(Tabled)]
struct EmptyRow {}

// ── Containers ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ContainerRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Uptime")]
    uptime: String,
    #[tabled(rename = "Image")]
    image: String,
    #[tabled(rename = "Ports")]
    ports: String,
}

fn render_containers(containers: &[ContainerSummary], format: &OutputFormat) -> String {
    output::render_list(
        format,
        containers,
        |c| ContainerRow {
            name: c.name.clone(),
            state: match &c.health {
                Some(health) => format!("{} ({health})", c.state),
                None => c.state.to_string(),
            },
            uptime: c.uptime_seconds.map(format_duration_secs).unwrap_or_default(),
            image: c.image.clone(),
            ports: c
                .ports
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(","),
        },
        |c| c.name.clone(),
    )
}

// ── Downloads ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DownloadRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "Down")]
    down: String,
    #[tabled(rename = "Up")]
    up: String,
    #[tabled(rename = "ETA")]
    eta: String,
    #[tabled(rename = "Size")]
    size: String,
}

#[allow(clippy::cast_precision_loss)]
fn render_downloads(items: &[DownloadItem], format: &OutputFormat) -> String {
    output::render_list(
        format,
        items,
        |d| DownloadRow {
            name: d.name.clone(),
            status: d.status.to_string(),
            progress: format!("{:.0}%", d.progress_percent),
            down: format_rate_bps(d.download_rate_bps as f64),
            up: format_rate_bps(d.upload_rate_bps as f64),
            eta: d.eta_seconds.map(format_duration_secs).unwrap_or_default(),
            size: format_bytes(d.size_bytes.max(0).unsigned_abs()),
        },
        |d| d.id.clone(),
    )
}

// ── System metrics ──────────────────────────────────────────────────

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn render_system(sample: &SystemSample, format: &OutputFormat) -> String {
    if !matches!(format, OutputFormat::Table) {
        return output::render_list(
            format,
            std::slice::from_ref(sample),
            |_| EmptyRow {},
            |s| s.hostname.clone().unwrap_or_default(),
        );
    }

    let mut rows = vec![
        metric("Host", sample.hostname.clone().unwrap_or_default()),
        metric("CPU", format!("{:.1}%", sample.cpu_percent)),
        metric("Memory", format!("{:.1}%", sample.memory_percent)),
    ];
    if let Some(swap) = sample.swap_percent {
        rows.push(metric("Swap", format!("{swap:.1}%")));
    }
    if let Some(disk) = sample.disk_percent {
        rows.push(metric("Disk", format!("{disk:.1}%")));
    }
    rows.push(metric(
        "Network",
        format!(
            "↓ {}  ↑ {}",
            format_rate_bps(sample.network_down_bps),
            format_rate_bps(sample.network_up_bps)
        ),
    ));
    if let Some(temp) = sample.cpu_temp_celsius {
        rows.push(metric("CPU temp", format!("{temp:.0}°C")));
    }
    if let Some((l1, l5, l15)) = sample.load {
        rows.push(metric("Load", format!("{l1:.2} {l5:.2} {l15:.2}")));
    }
    if let Some(uptime) = &sample.uptime {
        rows.push(metric("Uptime", uptime.clone()));
    }
    if let (Some(total), Some(running)) = (sample.process_count, sample.process_running) {
        rows.push(metric("Processes", format!("{running} running / {total}")));
    }
    for fs in &sample.filesystems {
        rows.push(metric(
            &format!("FS {}", fs.mount),
            format!(
                "{:.0}% ({} / {})",
                fs.percent,
                format_bytes(fs.used_bytes),
                format_bytes(fs.total_bytes)
            ),
        ));
    }

    tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string()
}

fn metric(name: &str, value: String) -> MetricRow {
    MetricRow {
        metric: name.to_owned(),
        value,
    }
}

// ── Calendar ────────────────────────────────────────────────────────

#[derive(Tabled)]
struct EventRow {
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Event")]
    event: String,
    #[tabled(rename = "Calendar")]
    calendar: String,
    #[tabled(rename = "Location")]
    location: String,
}

fn render_calendar(events: &[CalendarEvent], format: &OutputFormat) -> String {
    output::render_list(
        format,
        events,
        |e| EventRow {
            when: if e.all_day {
                e.start.format("%Y-%m-%d").to_string()
            } else {
                e.start.format("%Y-%m-%d %H:%M").to_string()
            },
            event: e.summary.clone(),
            calendar: e.calendar_name.clone().unwrap_or_default(),
            location: e.location.clone().unwrap_or_default(),
        },
        |e| e.id.clone(),
    )
}

// ── Feeds ───────────────────────────────────────────────────────────

#[derive(Tabled)]
struct FeedRow {
    #[tabled(rename = "Published")]
    published: String,
    #[tabled(rename = "Feed")]
    feed: String,
    #[tabled(rename = "Title")]
    title: String,
}

fn render_feed(items: &[FeedItem], format: &OutputFormat) -> String {
    let now = Utc::now();
    output::render_list(
        format,
        items,
        |i| FeedRow {
            published: i
                .pub_date
                .map(|t| format_relative(t, now))
                .unwrap_or_default(),
            feed: i.feed_name.clone().unwrap_or_else(|| i.feed_id.clone()),
            title: i.title.clone(),
        },
        |i| i.link.clone().unwrap_or_else(|| i.id.clone()),
    )
}

// ── Markets ─────────────────────────────────────────────────────────

#[derive(Tabled)]
struct QuoteRow {
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Price (USD)")]
    price: String,
    #[tabled(rename = "24h")]
    change: String,
}

fn render_markets(quotes: &[MarketQuote], format: &OutputFormat) -> String {
    output::render_list(
        format,
        quotes,
        |q| QuoteRow {
            symbol: q.symbol.clone(),
            kind: q.kind.to_string(),
            price: format!("{:.2}", q.price_usd),
            change: q
                .change_percent
                .map(|c| format!("{c:+.2}%"))
                .unwrap_or_default(),
        },
        |q| q.symbol.clone(),
    )
}
