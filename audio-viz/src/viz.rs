use crate::panels;
use crate::surfaces::{drain_promotions, sync_panel, Panel, PanelKind};
use arbiter::RenderArbiter;
use common::{ClassPrediction, ClassifyResponse};
use raster::ViewTransform;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    Document, Element, Event, FileReader, HtmlAudioElement, HtmlButtonElement, HtmlCanvasElement,
    HtmlElement, HtmlInputElement, IntersectionObserver, IntersectionObserverEntry, MouseEvent,
    Request, RequestInit, Response, WheelEvent,
};

// Palette shared by every panel
pub(crate) const BG_COLOR: &str = "#0a0a0f";
pub(crate) const PANEL_BG: &str = "#12121a";
pub(crate) const ACCENT_COLOR: &str = "#4ecdc4";
pub(crate) const ACCENT_SECONDARY: &str = "#ff6b6b";
pub(crate) const TEXT_COLOR: &str = "#e0e6ed";
pub(crate) const TEXT_DIM: &str = "#6b7280";

// Element ids double as arbiter surface ids for the panels
pub(crate) const PREDICTIONS_CANVAS: &str = "predictions-canvas";
const SPECTROGRAM_CANVAS: &str = "spectrogram-canvas";
const WAVEFORM_CANVAS: &str = "waveform-canvas";
const AUDIO_INPUT: &str = "audio-file-input";
const AUDIO_PLAYER: &str = "audio-player";
const CLASSIFY_BTN: &str = "classify-btn";
const STATUS_LINE: &str = "status-line";
const FEATURE_MAPS: &str = "feature-maps";

// The spectrogram is the headline view and wins contention; feature maps
// beat the waveform strip.
const SPECTROGRAM_PRIORITY: i32 = 2;
const FEATURE_MAP_PRIORITY: i32 = 1;
const WAVEFORM_PRIORITY: i32 = 0;

const DEFAULT_ENDPOINT: &str = "/api/classify";

/// Where the classification request currently stands. "No data yet",
/// "endpoint failed" and "render context denied" must stay visually
/// distinct, so the fetch lifecycle is explicit.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FetchState {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

pub(crate) struct State {
    endpoint: String,
    file_name: Option<String>,
    audio_b64: Option<String>,
    pub(crate) fetch_state: FetchState,
    pub(crate) response: Option<ClassifyResponse>,
    pub(crate) arbiter: RenderArbiter,
    pub(crate) panels: Vec<Panel>,
    /// Promotion ids queued by the arbiter subscriber, applied between
    /// event handlers.
    promoted: Rc<RefCell<Vec<String>>>,
    pub(crate) spectrogram_transform: ViewTransform,
    is_dragging: bool,
    drag_last_x: f64,
    drag_last_y: f64,
}

impl State {
    fn new(endpoint: String) -> Self {
        let promoted = Rc::new(RefCell::new(Vec::new()));
        let queue = Rc::clone(&promoted);
        let mut arbiter = RenderArbiter::new();
        arbiter.subscribe(move |id| queue.borrow_mut().push(id.to_string()));

        let panels = vec![
            Panel::new(
                SPECTROGRAM_CANVAS,
                PanelKind::Spectrogram,
                SPECTROGRAM_PRIORITY,
            ),
            Panel::new(WAVEFORM_CANVAS, PanelKind::Waveform, WAVEFORM_PRIORITY),
        ];

        Self {
            endpoint,
            file_name: None,
            audio_b64: None,
            fetch_state: FetchState::Idle,
            response: None,
            arbiter,
            panels,
            promoted,
            spectrogram_transform: ViewTransform::identity(),
            is_dragging: false,
            drag_last_x: 0.0,
            drag_last_y: 0.0,
        }
    }
}

thread_local! {
    static STATE: RefCell<Option<State>> = const { RefCell::new(None) };
    static OBSERVER: RefCell<Option<IntersectionObserver>> = const { RefCell::new(None) };
}

pub(crate) fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

pub fn init() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;

    let endpoint = document
        .body()
        .and_then(|body| body.get_attribute("data-endpoint"))
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
    log(&format!("audio-viz: endpoint {}", endpoint));

    STATE.with(|state| {
        *state.borrow_mut() = Some(State::new(endpoint));
    });

    setup_ui(&document)?;
    setup_handlers(&document)?;
    setup_observer(&document)?;
    render_all(&document)?;

    Ok(())
}

fn setup_ui(document: &Document) -> Result<(), JsValue> {
    let body = document.body().ok_or("no body")?;
    body.set_attribute(
        "style",
        &format!(
            "margin:0; background:{}; color:{}; font-family:monospace;",
            BG_COLOR, TEXT_COLOR
        ),
    )?;

    let header: HtmlElement = document.create_element("div")?.dyn_into()?;
    header.set_attribute("style", "padding: 16px 20px 4px;")?;
    header.set_inner_html("<h2 style=\"margin:0;\">Audio Classifier</h2>");
    body.append_child(&header)?;

    // Controls: picker, classify, playback, status
    let controls: HtmlElement = document.create_element("div")?.dyn_into()?;
    controls.set_attribute(
        "style",
        "padding: 8px 20px; display:flex; gap:12px; align-items:center; flex-wrap:wrap;",
    )?;

    let input: HtmlInputElement = document.create_element("input")?.dyn_into()?;
    input.set_id(AUDIO_INPUT);
    input.set_type("file");
    input.set_accept("audio/*");
    controls.append_child(&input)?;

    let button: HtmlButtonElement = document.create_element("button")?.dyn_into()?;
    button.set_id(CLASSIFY_BTN);
    button.set_text_content(Some("Classify"));
    button.set_disabled(true);
    button.set_attribute(
        "style",
        &format!(
            "background:{}; color:{}; border:none; padding:6px 14px; border-radius:4px; cursor:pointer;",
            ACCENT_COLOR, BG_COLOR
        ),
    )?;
    controls.append_child(&button)?;

    let audio: HtmlAudioElement = document.create_element("audio")?.dyn_into()?;
    audio.set_id(AUDIO_PLAYER);
    audio.set_controls(true);
    controls.append_child(&audio)?;

    let status: HtmlElement = document.create_element("span")?.dyn_into()?;
    status.set_id(STATUS_LINE);
    status.set_attribute("style", &format!("color:{};", TEXT_DIM))?;
    controls.append_child(&status)?;

    body.append_child(&controls)?;

    // Panels
    let container: HtmlElement = document.create_element("div")?.dyn_into()?;
    container.set_attribute("style", "padding: 8px 20px;")?;

    let predictions: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
    predictions.set_id(PREDICTIONS_CANVAS);
    predictions.set_width(380);
    predictions.set_height(160);
    predictions.set_attribute(
        "style",
        &format!("background:{}; border-radius:4px; display:block; margin:8px 0;", PANEL_BG),
    )?;
    container.append_child(&predictions)?;

    let spectrogram = create_panel(
        document,
        &container,
        "Mel spectrogram — scroll to zoom, drag to pan",
        SPECTROGRAM_CANVAS,
        520,
        280,
    )?;
    spectrogram.style().set_property("cursor", "grab")?;

    create_panel(document, &container, "Waveform", WAVEFORM_CANVAS, 520, 140)?;

    let feature_maps: HtmlElement = document.create_element("div")?.dyn_into()?;
    feature_maps.set_id(FEATURE_MAPS);
    container.append_child(&feature_maps)?;

    body.append_child(&container)?;

    Ok(())
}

/// Labeled panel canvas appended to `parent`.
fn create_panel(
    document: &Document,
    parent: &HtmlElement,
    title: &str,
    canvas_id: &str,
    width: u32,
    height: u32,
) -> Result<HtmlCanvasElement, JsValue> {
    let wrapper: HtmlElement = document.create_element("div")?.dyn_into()?;
    wrapper.set_attribute("style", "display:inline-block; margin:8px 8px 8px 0; vertical-align:top;")?;

    let label: HtmlElement = document.create_element("div")?.dyn_into()?;
    label.set_text_content(Some(title));
    label.set_attribute(
        "style",
        &format!("color:{}; font-size:12px; margin-bottom:4px;", TEXT_DIM),
    )?;
    wrapper.append_child(&label)?;

    let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
    canvas.set_id(canvas_id);
    canvas.set_width(width);
    canvas.set_height(height);
    canvas.set_attribute(
        "style",
        &format!("background:{}; border-radius:4px; display:block;", PANEL_BG),
    )?;
    wrapper.append_child(&canvas)?;

    parent.append_child(&wrapper)?;
    Ok(canvas)
}

fn setup_handlers(document: &Document) -> Result<(), JsValue> {
    // File selection
    let input = document
        .get_element_by_id(AUDIO_INPUT)
        .ok_or("no file input")?;
    let doc_clone = document.clone();
    let change_closure = Closure::wrap(Box::new(move |_event: Event| {
        handle_audio_file_selected(&doc_clone);
    }) as Box<dyn FnMut(Event)>);
    input.add_event_listener_with_callback("change", change_closure.as_ref().unchecked_ref())?;
    change_closure.forget();

    // Classify button
    let button = document
        .get_element_by_id(CLASSIFY_BTN)
        .ok_or("no classify button")?;
    let doc_clone = document.clone();
    let click_closure = Closure::wrap(Box::new(move |_event: MouseEvent| {
        start_classification(&doc_clone);
    }) as Box<dyn FnMut(MouseEvent)>);
    button.add_event_listener_with_callback("click", click_closure.as_ref().unchecked_ref())?;
    click_closure.forget();

    // Spectrogram pan/zoom
    let canvas = document
        .get_element_by_id(SPECTROGRAM_CANVAS)
        .ok_or("no spectrogram canvas")?
        .dyn_into::<HtmlCanvasElement>()?;

    let doc_clone = document.clone();
    let wheel_closure = Closure::wrap(Box::new(move |event: WheelEvent| {
        event.prevent_default();
        let x = event.offset_x() as f64;
        let y = event.offset_y() as f64;
        let factor = if event.delta_y() > 0.0 { 0.9 } else { 1.1 };

        STATE.with(|state| {
            if let Some(ref mut s) = *state.borrow_mut() {
                s.spectrogram_transform.zoom_at(x, y, factor);
            }
        });
        let _ = render_panel_by_id(&doc_clone, SPECTROGRAM_CANVAS);
    }) as Box<dyn FnMut(WheelEvent)>);
    canvas.add_event_listener_with_callback("wheel", wheel_closure.as_ref().unchecked_ref())?;
    wheel_closure.forget();

    let mousedown_closure = Closure::wrap(Box::new(move |event: MouseEvent| {
        STATE.with(|state| {
            if let Some(ref mut s) = *state.borrow_mut() {
                s.is_dragging = true;
                s.drag_last_x = event.offset_x() as f64;
                s.drag_last_y = event.offset_y() as f64;
            }
        });
    }) as Box<dyn FnMut(MouseEvent)>);
    canvas
        .add_event_listener_with_callback("mousedown", mousedown_closure.as_ref().unchecked_ref())?;
    mousedown_closure.forget();

    let doc_clone = document.clone();
    let mousemove_closure = Closure::wrap(Box::new(move |event: MouseEvent| {
        let moved = STATE.with(|state| {
            if let Some(ref mut s) = *state.borrow_mut() {
                if !s.is_dragging {
                    return false;
                }
                let x = event.offset_x() as f64;
                let y = event.offset_y() as f64;
                s.spectrogram_transform
                    .pan_by(x - s.drag_last_x, y - s.drag_last_y);
                s.drag_last_x = x;
                s.drag_last_y = y;
                true
            } else {
                false
            }
        });
        if moved {
            let _ = render_panel_by_id(&doc_clone, SPECTROGRAM_CANVAS);
        }
    }) as Box<dyn FnMut(MouseEvent)>);
    canvas
        .add_event_listener_with_callback("mousemove", mousemove_closure.as_ref().unchecked_ref())?;
    mousemove_closure.forget();

    for event_name in ["mouseup", "mouseleave"] {
        let end_closure = Closure::wrap(Box::new(move |_event: MouseEvent| {
            STATE.with(|state| {
                if let Some(ref mut s) = *state.borrow_mut() {
                    s.is_dragging = false;
                }
            });
        }) as Box<dyn FnMut(MouseEvent)>);
        canvas
            .add_event_listener_with_callback(event_name, end_closure.as_ref().unchecked_ref())?;
        end_closure.forget();
    }

    Ok(())
}

/// Visibility drives the register/unregister protocol: panels scrolled out
/// of view release the render context so a waiting panel can take it.
fn setup_observer(document: &Document) -> Result<(), JsValue> {
    let doc = document.clone();
    let callback = Closure::wrap(Box::new(
        move |entries: js_sys::Array, _observer: IntersectionObserver| {
            STATE.with(|state| {
                if let Some(ref mut s) = *state.borrow_mut() {
                    for entry in entries.iter() {
                        let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                            continue;
                        };
                        let id = entry.target().id();
                        if let Some(panel) = s.panels.iter_mut().find(|p| p.id == id) {
                            panel.visible = entry.is_intersecting();
                        }
                    }

                    for panel in s.panels.iter_mut() {
                        sync_panel(&mut s.arbiter, panel);
                    }
                    drain_promotions(&mut s.arbiter, &mut s.panels, &s.promoted);

                    // ownership may have moved mid-loop; settle every flag
                    for panel in s.panels.iter_mut() {
                        panel.granted = s.arbiter.is_owner(&panel.id);
                    }
                }
            });
            let _ = render_all(&doc);
        },
    )
        as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>);

    let observer = IntersectionObserver::new(callback.as_ref().unchecked_ref())?;
    callback.forget();

    OBSERVER.with(|slot| *slot.borrow_mut() = Some(observer));

    for id in [SPECTROGRAM_CANVAS, WAVEFORM_CANVAS] {
        if let Some(element) = document.get_element_by_id(id) {
            observe_panel(&element);
        }
    }

    Ok(())
}

fn observe_panel(element: &Element) {
    OBSERVER.with(|observer| {
        if let Some(observer) = observer.borrow().as_ref() {
            observer.observe(element);
        }
    });
}

fn handle_audio_file_selected(document: &Document) {
    let Some(input) = document.get_element_by_id(AUDIO_INPUT) else {
        return;
    };
    let Ok(input) = input.dyn_into::<HtmlInputElement>() else {
        return;
    };
    let Some(files) = input.files() else {
        return;
    };
    let Some(file) = files.get(0) else {
        return;
    };
    let file_name = file.name();

    let reader = match FileReader::new() {
        Ok(reader) => reader,
        Err(e) => {
            log(&format!("failed to create FileReader: {:?}", e));
            return;
        }
    };

    let doc = document.clone();
    let onload = Closure::wrap(Box::new(move |event: Event| {
        let Some(target) = event.target() else {
            return;
        };
        let Ok(reader) = target.dyn_into::<FileReader>() else {
            return;
        };
        let Ok(result) = reader.result() else {
            return;
        };
        let Some(data_url) = result.as_string() else {
            return;
        };
        let Some(b64) = data_url_base64(&data_url) else {
            log("file did not read as a base64 data URL");
            return;
        };
        let b64 = b64.to_string();

        STATE.with(|state| {
            if let Some(ref mut s) = *state.borrow_mut() {
                s.audio_b64 = Some(b64);
                s.file_name = Some(file_name.clone());
                s.fetch_state = FetchState::Idle;
            }
        });

        if let Some(player) = doc.get_element_by_id(AUDIO_PLAYER) {
            if let Ok(player) = player.dyn_into::<HtmlAudioElement>() {
                player.set_src(&data_url);
            }
        }
        if let Some(button) = doc.get_element_by_id(CLASSIFY_BTN) {
            if let Ok(button) = button.dyn_into::<HtmlButtonElement>() {
                button.set_disabled(false);
            }
        }

        let _ = render_all(&doc);
    }) as Box<dyn FnMut(Event)>);

    reader.set_onload(Some(onload.as_ref().unchecked_ref()));
    onload.forget();

    if let Err(e) = reader.read_as_data_url(&file) {
        log(&format!("failed to read file: {:?}", e));
    }
}

fn start_classification(document: &Document) {
    let request = STATE.with(|state| {
        state
            .borrow()
            .as_ref()
            .and_then(|s| s.audio_b64.clone().map(|b64| (s.endpoint.clone(), b64)))
    });
    let Some((endpoint, audio_b64)) = request else {
        log("classify clicked with no audio loaded");
        return;
    };

    STATE.with(|state| {
        if let Some(ref mut s) = *state.borrow_mut() {
            s.fetch_state = FetchState::Loading;
        }
    });
    let _ = render_all(document);

    let document = document.clone();
    spawn_local(async move {
        let outcome = classify(&endpoint, &audio_b64).await;

        let loaded = STATE.with(|state| {
            if let Some(ref mut s) = *state.borrow_mut() {
                match outcome {
                    Ok(response) => {
                        s.response = Some(response);
                        s.fetch_state = FetchState::Loaded;
                        true
                    }
                    Err(message) => {
                        log(&format!("classification failed: {}", message));
                        s.fetch_state = FetchState::Failed(message);
                        false
                    }
                }
            } else {
                false
            }
        });

        if loaded {
            let _ = rebuild_feature_map_panels(&document);
        }
        let _ = render_all(&document);
    });
}

async fn classify(endpoint: &str, audio_b64: &str) -> Result<ClassifyResponse, String> {
    let payload = serde_json::json!({ "audio_data": audio_b64 }).to_string();

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_body(&JsValue::from_str(&payload));

    let request =
        Request::new_with_str_and_init(endpoint, &init).map_err(|e| format!("{:?}", e))?;
    request
        .headers()
        .set("Content-Type", "application/json")
        .map_err(|e| format!("{:?}", e))?;

    let window = web_sys::window().ok_or_else(|| "no window".to_string())?;
    let response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| format!("{:?}", e))?;
    let response: Response = response.dyn_into().map_err(|_| "not a Response".to_string())?;

    if !response.ok() {
        return Err(format!("endpoint returned HTTP {}", response.status()));
    }

    let text = JsFuture::from(response.text().map_err(|e| format!("{:?}", e))?)
        .await
        .map_err(|e| format!("{:?}", e))?;
    let text = text.as_string().ok_or_else(|| "empty body".to_string())?;

    ClassifyResponse::from_json_bytes(text.as_bytes()).map_err(|e| e.to_string())
}

/// Rebuild one feature-map panel per CNN layer in the latest response.
fn rebuild_feature_map_panels(document: &Document) -> Result<(), JsValue> {
    let container: HtmlElement = document
        .get_element_by_id(FEATURE_MAPS)
        .ok_or("no feature map container")?
        .dyn_into()?;

    let layer_names: Vec<String> = STATE.with(|state| {
        state
            .borrow()
            .as_ref()
            .and_then(|s| s.response.as_ref().map(|r| r.layer_names()))
            .unwrap_or_default()
    });

    // retire panels from the previous response
    STATE.with(|state| {
        if let Some(ref mut s) = *state.borrow_mut() {
            let stale: Vec<String> = s
                .panels
                .iter()
                .filter(|p| matches!(p.kind, PanelKind::FeatureMap(_)))
                .map(|p| p.id.clone())
                .collect();
            for id in &stale {
                s.arbiter.unregister(id);
            }
            s.panels.retain(|p| !matches!(p.kind, PanelKind::FeatureMap(_)));
        }
    });
    container.set_inner_html("");

    for name in &layer_names {
        let id = feature_panel_id(name);
        let canvas = create_panel(document, &container, name, &id, 220, 160)?;

        STATE.with(|state| {
            if let Some(ref mut s) = *state.borrow_mut() {
                s.panels.push(Panel::new(
                    &id,
                    PanelKind::FeatureMap(name.clone()),
                    FEATURE_MAP_PRIORITY,
                ));
            }
        });
        observe_panel(&canvas);
    }

    // the retirements above may have promoted a surviving panel
    STATE.with(|state| {
        if let Some(ref mut s) = *state.borrow_mut() {
            drain_promotions(&mut s.arbiter, &mut s.panels, &s.promoted);
        }
    });

    Ok(())
}

fn render_all(document: &Document) -> Result<(), JsValue> {
    STATE.with(|state| {
        let state = state.borrow();
        let Some(s) = state.as_ref() else {
            return Ok(());
        };

        update_status(document, s)?;
        panels::render_predictions(document, s)?;
        for panel in &s.panels {
            panels::render_panel(document, s, panel)?;
        }
        Ok(())
    })
}

fn render_panel_by_id(document: &Document, id: &str) -> Result<(), JsValue> {
    STATE.with(|state| {
        let state = state.borrow();
        let Some(s) = state.as_ref() else {
            return Ok(());
        };
        let Some(panel) = s.panels.iter().find(|p| p.id == id) else {
            return Ok(());
        };
        panels::render_panel(document, s, panel)
    })
}

fn update_status(document: &Document, state: &State) -> Result<(), JsValue> {
    let Some(element) = document.get_element_by_id(STATUS_LINE) else {
        return Ok(());
    };
    let element: HtmlElement = element.dyn_into()?;

    let (message, color) = status_message(
        &state.fetch_state,
        state.file_name.as_deref(),
        state.response.as_ref().and_then(|r| r.top_prediction()),
    );
    element.set_text_content(Some(&message));
    element.style().set_property("color", color)?;

    Ok(())
}

/// The base64 tail of a data URL, if it has one.
fn data_url_base64(data_url: &str) -> Option<&str> {
    let marker = "base64,";
    let index = data_url.find(marker)?;
    let tail = &data_url[index + marker.len()..];
    if tail.is_empty() {
        None
    } else {
        Some(tail)
    }
}

/// Canvas/surface id for a CNN layer panel. Layer names come from the
/// endpoint, so anything outside [a-zA-Z0-9_-] is squashed.
fn feature_panel_id(layer: &str) -> String {
    let safe: String = layer
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("feature-{}", safe)
}

fn status_message(
    fetch: &FetchState,
    file_name: Option<&str>,
    top: Option<&ClassPrediction>,
) -> (String, &'static str) {
    match fetch {
        FetchState::Failed(error) => (format!("Endpoint error: {}", error), ACCENT_SECONDARY),
        FetchState::Loading => ("Classifying...".to_string(), ACCENT_COLOR),
        FetchState::Loaded => match top {
            Some(p) => (format!("{} ({})", p.class, p.confidence_pct()), ACCENT_COLOR),
            None => ("No predictions returned".to_string(), TEXT_DIM),
        },
        FetchState::Idle => match file_name {
            Some(name) => (format!("Ready: {}", name), TEXT_COLOR),
            None => ("Choose an audio clip".to_string(), TEXT_DIM),
        },
    }
}
