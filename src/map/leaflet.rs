//! Leaflet bindings. Expects the page to load Leaflet so that `window.L`
//! exists before the map is attached.

use super::MapWidget;
use crate::config::MapConfig;
use crate::models::{LatLng, Note};
use crate::text::note_popup;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

#[wasm_bindgen]
extern "C" {
    type LMap;

    #[wasm_bindgen(js_namespace = L, js_name = map)]
    fn l_map(container_id: &str, options: &JsValue) -> LMap;

    #[wasm_bindgen(method, js_name = setView)]
    fn set_view(this: &LMap, center: &js_sys::Array, zoom: f64) -> LMap;

    #[wasm_bindgen(method, js_name = setMaxBounds)]
    fn set_max_bounds(this: &LMap, bounds: &js_sys::Array) -> LMap;

    #[wasm_bindgen(method, js_name = getZoom)]
    fn get_zoom(this: &LMap) -> f64;

    #[wasm_bindgen(method, js_name = panTo)]
    fn pan_to(this: &LMap, center: &js_sys::Array) -> LMap;

    #[wasm_bindgen(method, js_name = on)]
    fn on(this: &LMap, event: &str, handler: &js_sys::Function) -> LMap;

    type Layer;

    #[wasm_bindgen(js_namespace = L, js_name = tileLayer)]
    fn tile_layer(url: &str, options: &JsValue) -> Layer;

    #[wasm_bindgen(js_namespace = L, js_name = marker)]
    fn l_marker(at: &js_sys::Array) -> Layer;

    #[wasm_bindgen(js_namespace = L, js_name = circleMarker)]
    fn circle_marker(at: &js_sys::Array, options: &JsValue) -> Layer;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_to_map(this: &Layer, map: &LMap) -> Layer;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_to_group(this: &Layer, group: &LayerGroup) -> Layer;

    #[wasm_bindgen(method, js_name = on)]
    fn on_layer(this: &Layer, event: &str, handler: &js_sys::Function) -> Layer;

    #[wasm_bindgen(method)]
    fn remove(this: &Layer) -> Layer;

    #[wasm_bindgen(method, js_name = bindPopup)]
    fn bind_popup(this: &Layer, content: &str) -> Layer;

    type LayerGroup;

    #[wasm_bindgen(js_namespace = L, js_name = layerGroup)]
    fn layer_group() -> LayerGroup;

    #[wasm_bindgen(method, js_name = addTo)]
    fn group_add_to(this: &LayerGroup, map: &LMap) -> LayerGroup;

    #[wasm_bindgen(method, js_name = clearLayers)]
    fn clear_layers(this: &LayerGroup) -> LayerGroup;
}

pub type MapClickHandler = Rc<dyn Fn(LatLng)>;
pub type MarkerClickHandler = Rc<dyn Fn(Note, LatLng)>;

type Listener = Closure<dyn FnMut(JsValue)>;

struct Attached {
    map: LMap,
    notes: LayerGroup,
    pointer: Option<Layer>,
    /// One per note marker; dropped together with the markers.
    marker_listeners: Vec<Listener>,
    _map_click: Listener,
}

/// [`MapWidget`] backed by a Leaflet map.
///
/// Calls made before [`LeafletMap::attach`] are dropped; the controller
/// replays its state once the container exists.
pub struct LeafletMap {
    config: MapConfig,
    on_click: MapClickHandler,
    on_marker: MarkerClickHandler,
    inner: RefCell<Option<Attached>>,
}

fn lat_lng(at: LatLng) -> js_sys::Array {
    js_sys::Array::of2(&at.lat.into(), &at.long.into())
}

fn options(pairs: &[(&str, JsValue)]) -> JsValue {
    let obj = js_sys::Object::new();
    for (k, v) in pairs {
        let _ = js_sys::Reflect::set(&obj, &JsValue::from_str(k), v);
    }
    obj.into()
}

/// `event.latlng` of a Leaflet mouse event.
fn event_lat_lng(ev: &JsValue) -> Option<LatLng> {
    let ll = js_sys::Reflect::get(ev, &"latlng".into()).ok()?;
    let lat = js_sys::Reflect::get(&ll, &"lat".into()).ok()?.as_f64()?;
    let long = js_sys::Reflect::get(&ll, &"lng".into()).ok()?.as_f64()?;
    Some(LatLng::new(lat, long))
}

impl LeafletMap {
    pub fn new(
        config: MapConfig,
        on_click: MapClickHandler,
        on_marker: MarkerClickHandler,
    ) -> Self {
        Self {
            config,
            on_click,
            on_marker,
            inner: RefCell::new(None),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.inner.borrow().is_some()
    }

    /// Create the Leaflet map inside the element with `container_id`.
    pub fn attach(&self, container_id: &str) {
        if self.is_attached() {
            return;
        }

        let c = &self.config;
        let map = l_map(
            container_id,
            &options(&[
                ("minZoom", c.min_zoom.into()),
                ("maxZoom", c.max_zoom.into()),
                ("maxBoundsViscosity", 1.0.into()),
            ]),
        );
        map.set_view(&lat_lng(c.center), c.zoom);
        map.set_max_bounds(&js_sys::Array::of2(
            &lat_lng(LatLng::new(-89.98, -180.0)),
            &lat_lng(LatLng::new(89.99, 180.0)),
        ));

        tile_layer(
            &c.tile_url,
            &options(&[("attribution", c.attribution.as_str().into())]),
        )
        .add_to_map(&map);

        let notes = layer_group();
        notes.group_add_to(&map);

        let on_click = self.on_click.clone();
        let map_click = Closure::<dyn FnMut(JsValue)>::new(move |ev: JsValue| {
            if let Some(at) = event_lat_lng(&ev) {
                on_click(at);
            }
        });
        map.on("click", map_click.as_ref().unchecked_ref());

        tracing::debug!(container_id, "map attached");
        *self.inner.borrow_mut() = Some(Attached {
            map,
            notes,
            pointer: None,
            marker_listeners: Vec::new(),
            _map_click: map_click,
        });
    }
}

impl MapWidget for LeafletMap {
    fn show_pointer(&self, at: LatLng) {
        let mut inner = self.inner.borrow_mut();
        let Some(a) = inner.as_mut() else {
            return;
        };
        if let Some(old) = a.pointer.take() {
            old.remove();
        }
        a.pointer = Some(l_marker(&lat_lng(at)).add_to_map(&a.map));
    }

    fn hide_pointer(&self) {
        if let Some(a) = self.inner.borrow_mut().as_mut() {
            if let Some(old) = a.pointer.take() {
                old.remove();
            }
        }
    }

    fn clear_notes(&self) {
        if let Some(a) = self.inner.borrow_mut().as_mut() {
            a.notes.clear_layers();
            a.marker_listeners.clear();
        }
    }

    fn add_notes(&self, notes: &[Note]) {
        let mut inner = self.inner.borrow_mut();
        let Some(a) = inner.as_mut() else {
            return;
        };

        for note in notes {
            let marker = circle_marker(
                &lat_lng(note.position()),
                &options(&[("radius", 8.0.into())]),
            )
            .add_to_group(&a.notes);
            if let Some(html) = note_popup(note) {
                marker.bind_popup(&html);
            }

            let on_marker = self.on_marker.clone();
            let bound = note.clone();
            let listener = Closure::<dyn FnMut(JsValue)>::new(move |ev: JsValue| {
                let at = event_lat_lng(&ev).unwrap_or_else(|| bound.position());
                on_marker(bound.clone(), at);
            });
            marker.on_layer("click", listener.as_ref().unchecked_ref());
            a.marker_listeners.push(listener);
        }
    }

    fn zoom(&self) -> f64 {
        self.inner
            .borrow()
            .as_ref()
            .map(|a| a.map.get_zoom())
            .unwrap_or(self.config.zoom)
    }

    fn pan_to(&self, center: LatLng) {
        if let Some(a) = self.inner.borrow().as_ref() {
            a.map.pan_to(&lat_lng(center));
        }
    }
}
