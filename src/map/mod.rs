mod basemap;
mod bounds;
mod geometry;
mod overlay;
mod projection;
mod surface;
mod view;

pub use basemap::{load_basemap, Basemap, MapInitError};
pub use bounds::{GeoBounds, GeoPoint};
pub use overlay::{severity_color, site_popup, SiteOverlay};
pub use projection::Viewport;
pub use surface::{CircleLayer, Control, ControlAction, LayerId, MapSurface, Marker, Popup};
pub use view::{MapLayers, MapStatus, MapView, PopupView};
