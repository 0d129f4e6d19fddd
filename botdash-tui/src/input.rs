//! Input dispatch - overlays → global keys → panel-specific handlers.
//!
//! Mouse events only matter on the advanced chart, where they are mapped
//! into the plot's data space and fed to the chart's pointer state machine.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use botdash_core::chart::{ChartMode, DrawTool, PointerEvent, ViewRange};

use crate::app::{AppState, ChartTab, ErrorCategory, Overlay, Panel, METRIC_COLUMNS};
use crate::ui::chart_view;

/// Range slider step, in percent of the series.
const SLIDER_STEP_PCT: f64 = 5.0;

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Overlays consume input first.
    match &app.overlay {
        Overlay::Chart => {
            handle_chart_key(app, key);
            return;
        }
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
            return;
        }
        Overlay::EditParam(_) => {
            handle_edit_overlay(app, key);
            return;
        }
        Overlay::None => {}
    }

    // 2. Global keys.
    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Char(c @ '1'..='5') => {
            let idx = c as usize - '1' as usize;
            if let Some(panel) = Panel::from_index(idx) {
                app.active_panel = panel;
            }
            return;
        }
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.active_panel = app.active_panel.prev();
            } else {
                app.active_panel = app.active_panel.next();
            }
            return;
        }
        KeyCode::BackTab => {
            app.active_panel = app.active_panel.prev();
            return;
        }
        KeyCode::Char('r') => {
            app.request_refresh();
            return;
        }
        KeyCode::Char('e') => {
            app.overlay = Overlay::ErrorHistory;
            app.error_scroll = 0;
            return;
        }
        _ => {}
    }

    // 3. Panel-specific keys.
    match app.active_panel {
        Panel::Metrics => handle_metrics_key(app, key),
        Panel::Trading => handle_trading_key(app, key),
        Panel::Strategy => handle_strategy_key(app, key),
        Panel::Market => handle_market_key(app, key),
        Panel::Help => {}
    }
}

pub fn handle_mouse(app: &mut AppState, mouse: MouseEvent) {
    if app.overlay != Overlay::Chart {
        return;
    }
    let rect = chart_view::plot_rect(app.screen);
    let Some(chart) = app.chart.as_mut() else {
        return;
    };
    if chart.tab != ChartTab::Chart {
        return;
    }

    let (x, y) = (f64::from(mouse.column), f64::from(mouse.row));
    let inside = rect.contains(x, y);
    let event = match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => PointerEvent::Down,
        MouseEventKind::Up(MouseButton::Left) => PointerEvent::Up,
        MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
            // Terminals report no leave event; crossing the plot edge stands in for it.
            if chart.pointer_inside && !inside {
                PointerEvent::Leave
            } else {
                PointerEvent::Move
            }
        }
        MouseEventKind::ScrollUp if inside => {
            chart.view.zoom_in();
            return;
        }
        MouseEventKind::ScrollDown if inside => {
            chart.view.zoom_out();
            return;
        }
        _ => return,
    };
    chart.pointer_inside = inside;
    chart.view.pointer(event, rect, x, y);
}

fn handle_error_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('e') => {
            app.overlay = Overlay::None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.error_scroll + 1 < app.error_history.len() {
                app.error_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.error_scroll = app.error_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_edit_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.overlay = Overlay::None;
            app.edit_input.clear();
        }
        KeyCode::Enter => {
            let input = std::mem::take(&mut app.edit_input);
            let name = match &app.overlay {
                Overlay::EditParam(name) => name.clone(),
                _ => String::new(),
            };
            app.overlay = Overlay::None;
            match app.strategy.set_from_input(&input) {
                Ok(()) => app.set_status(format!("{name} = {}", input.trim())),
                Err(e) => app.push_error(ErrorCategory::Input, e.to_string(), name),
            }
        }
        KeyCode::Backspace => {
            app.edit_input.pop();
        }
        KeyCode::Char(c) => {
            app.edit_input.push(c);
        }
        _ => {}
    }
}

fn handle_chart_key(app: &mut AppState, key: KeyEvent) {
    if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
        app.close_chart();
        return;
    }
    let Some(chart) = app.chart.as_mut() else {
        app.overlay = Overlay::None;
        return;
    };
    let view = &mut chart.view;
    let len = view.series().len();
    match key.code {
        KeyCode::Tab | KeyCode::BackTab => chart.tab = chart.tab.toggle(),
        KeyCode::Char('v') => view.set_mode(ChartMode::View),
        KeyCode::Char('p') => view.set_mode(ChartMode::Pan),
        KeyCode::Char('z') => view.set_mode(ChartMode::Zoom),
        KeyCode::Char('d') => view.set_mode(ChartMode::Draw),
        KeyCode::Char('t') => {
            let next = match view.tool() {
                DrawTool::TrendLine => DrawTool::Horizontal,
                DrawTool::Horizontal => DrawTool::Vertical,
                DrawTool::Vertical => DrawTool::TrendLine,
            };
            view.set_tool(next);
        }
        KeyCode::Char('+') | KeyCode::Char('=') => view.zoom_in(),
        KeyCode::Char('-') => view.zoom_out(),
        KeyCode::Left | KeyCode::Char('h') => {
            let step = pan_step(view.range().span());
            view.pan(-step);
        }
        KeyCode::Right | KeyCode::Char('l') => {
            let step = pan_step(view.range().span());
            view.pan(step);
        }
        KeyCode::Char(c @ ('[' | ']' | '{' | '}')) => {
            let step = slider_step(len);
            let r = view.range();
            let (start, end) = match c {
                '[' => (r.start.saturating_sub(step), r.end),
                ']' => ((r.start + step).min(r.end), r.end),
                '{' => (r.start, r.end.saturating_sub(step).max(r.start)),
                _ => (r.start, r.end + step),
            };
            view.set_range(ViewRange { start, end });
        }
        KeyCode::Char('0') => view.reset(),
        KeyCode::Char('x') => view.clear_drawings(),
        KeyCode::Char('c') => {
            let next = view.chart_type().next();
            view.set_chart_type(next);
            app.chart_type = next;
        }
        _ => {}
    }
}

/// A tenth of the window, at least one point.
fn pan_step(span: usize) -> isize {
    (span / 10).max(1) as isize
}

/// Slider keys move a handle by this many points, never less than one.
fn slider_step(len: usize) -> usize {
    let gaps = len.saturating_sub(1) as f64;
    ((gaps * SLIDER_STEP_PCT / 100.0).round() as usize).max(1)
}

fn handle_metrics_key(app: &mut AppState, key: KeyEvent) {
    let count = app.snapshot.as_ref().map_or(0, |s| s.features.len());
    match key.code {
        KeyCode::Char('l') | KeyCode::Right => app.metrics.step(1, count),
        KeyCode::Char('h') | KeyCode::Left => app.metrics.step(-1, count),
        KeyCode::Char('j') | KeyCode::Down => app.metrics.step(METRIC_COLUMNS as isize, count),
        KeyCode::Char('k') | KeyCode::Up => app.metrics.step(-(METRIC_COLUMNS as isize), count),
        KeyCode::Enter => app.open_chart(),
        _ => {}
    }
}

fn handle_trading_key(app: &mut AppState, key: KeyEvent) {
    let count = app.snapshot.as_ref().map_or(0, |s| s.orders.len());
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.trading.order_cursor + 1 < count {
                app.trading.order_cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.trading.order_cursor = app.trading.order_cursor.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_strategy_key(app: &mut AppState, key: KeyEvent) {
    let rows = app.strategy.row_count();
    let result = match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.strategy.cursor + 1 < rows {
                app.strategy.cursor += 1;
            }
            Ok(())
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.strategy.cursor = app.strategy.cursor.saturating_sub(1);
            Ok(())
        }
        KeyCode::Char('h') | KeyCode::Left => app.strategy.adjust(-1.0),
        KeyCode::Char('l') | KeyCode::Right => app.strategy.adjust(1.0),
        KeyCode::Char(' ') => app.strategy.toggle(),
        KeyCode::Enter => {
            let selected = app.strategy.selected_param().map(str::to_string);
            match selected {
                Some(name) => {
                    app.edit_input = app
                        .strategy
                        .draft
                        .as_ref()
                        .and_then(|d| d.parameters.get(&name))
                        .map(|p| p.value.to_string())
                        .unwrap_or_default();
                    app.overlay = Overlay::EditParam(name);
                    Ok(())
                }
                None => app.strategy.toggle(),
            }
        }
        KeyCode::Char('s') => {
            app.save_strategy();
            Ok(())
        }
        KeyCode::Char('u') => {
            app.revert_strategy();
            Ok(())
        }
        _ => Ok(()),
    };
    if let Err(e) = result {
        let context = app.strategy.selected_param().unwrap_or("enabled").to_string();
        app.push_error(ErrorCategory::Input, e.to_string(), context);
    }
}

fn handle_market_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => app.market.timeframe = app.market.timeframe.prev(),
        KeyCode::Char('l') | KeyCode::Right => app.market.timeframe = app.market.timeframe.next(),
        KeyCode::Char('c') => app.chart_type = app.chart_type.next(),
        _ => {}
    }
}
