//! JSON field names of the ESRI symbol export format.
//!
//! These strings are the wire contract with the MXD/LYR exporter and must
//! match it exactly.

// Kind keys
pub const SIMPLE_FILL_SYMBOL: &str = "SimpleFillSymbol";
pub const LINE_FILL_SYMBOL: &str = "LineFillSymbol";
pub const PICTURE_FILL_SYMBOL: &str = "PictureFillSymbol";
pub const MULTI_LAYER_FILL_SYMBOL: &str = "MultiLayerFillSymbol";
pub const SIMPLE_LINE_SYMBOL: &str = "SimpleLineSymbol";
pub const CARTOGRAPHIC_LINE_SYMBOL: &str = "CartographicLineSymbol";
pub const MULTI_LAYER_LINE_SYMBOL: &str = "MultiLayerLineSymbol";
pub const SIMPLE_MARKER_SYMBOL: &str = "SimpleMarkerSymbol";
pub const CHARACTER_MARKER_SYMBOL: &str = "CharacterMarkerSymbol";
pub const MULTI_LAYER_MARKER_SYMBOL: &str = "MultiLayerMarkerSymbol";
pub const TEXT_SYMBOL: &str = "TextSymbol";

// Shared symbol attributes
pub const COLOUR: &str = "color";
pub const ANGLE: &str = "angle";
pub const WIDTH: &str = "width";
pub const SIZE: &str = "size";
pub const STYLE: &str = "style";
pub const X_OFFSET: &str = "xOffset";
pub const Y_OFFSET: &str = "yOffset";
pub const OUTLINE: &str = "outline";

// Colour object
pub const RED: &str = "red";
pub const GREEN: &str = "green";
pub const BLUE: &str = "blue";

// Cartographic line
pub const TEMPLATE: &str = "template";
pub const TEMPLATE_MARK: &str = "mark";
pub const TEMPLATE_GAP: &str = "gap";
pub const LINE_START_OFFSET: &str = "lineStartOffset";
pub const CAP: &str = "cap";
pub const JOIN: &str = "join";

// Line fill
pub const SEPARATION: &str = "separation";

// Picture fill
pub const PICTURE: &str = "picture";
pub const BACKGROUND_COLOUR: &str = "backgroundColor";
pub const PICTURE_IMAGE: &str = "image";
pub const PICTURE_WIDTH: &str = "width";
pub const PICTURE_HEIGHT: &str = "height";
pub const PICTURE_TYPE: &str = "type";

// Markers
pub const OUTLINE_COLOUR: &str = "outlineColor";
pub const OUTLINE_SIZE: &str = "outlineSize";
pub const CHARACTER_INDEX: &str = "characterIndex";

// Fonts and text
pub const FONT: &str = "font";
pub const FONT_NAME: &str = "fontName";
pub const BOLD: &str = "bold";
pub const ITALIC: &str = "italic";
pub const SHADOW_COLOUR: &str = "shadowColor";
pub const SHADOW_X_OFFSET: &str = "shadowXOffset";
pub const SHADOW_Y_OFFSET: &str = "shadowYOffset";
