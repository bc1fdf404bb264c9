//! Registry of record tag values used by HWP 5.x streams.
//!
//! Tags are 10-bit values. Everything defined by the format starts at
//! [`TAG_BEGIN`]; values outside this registry are still legal on the wire
//! and decode to opaque payloads.

use num_enum::TryFromPrimitive;

/// First tag value assigned by the format.
pub const TAG_BEGIN: u16 = 0x010;

/// Every record tag known to this reader.
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum HwpTag {
    // DocInfo stream
    DocumentProperties = TAG_BEGIN,
    IdMappings = TAG_BEGIN + 1,
    BinData = TAG_BEGIN + 2,
    FaceName = TAG_BEGIN + 3,
    BorderFill = TAG_BEGIN + 4,
    CharShape = TAG_BEGIN + 5,
    TabDef = TAG_BEGIN + 6,
    Numbering = TAG_BEGIN + 7,
    Bullet = TAG_BEGIN + 8,
    ParaShape = TAG_BEGIN + 9,
    Style = TAG_BEGIN + 10,
    DocData = TAG_BEGIN + 11,
    DistributeDocData = TAG_BEGIN + 12,
    CompatibleDocument = TAG_BEGIN + 14,
    LayoutCompatibility = TAG_BEGIN + 15,
    TrackChange = TAG_BEGIN + 16,
    MemoShape = TAG_BEGIN + 76,
    ForbiddenChar = TAG_BEGIN + 78,
    TrackChangeContent = TAG_BEGIN + 80,
    TrackChangeAuthor = TAG_BEGIN + 81,

    // BodyText / ViewText streams
    ParaHeader = TAG_BEGIN + 50,
    ParaText = TAG_BEGIN + 51,
    ParaCharShape = TAG_BEGIN + 52,
    ParaLineSeg = TAG_BEGIN + 53,
    ParaRangeTag = TAG_BEGIN + 54,
    CtrlHeader = TAG_BEGIN + 55,
    ListHeader = TAG_BEGIN + 56,
    PageDef = TAG_BEGIN + 57,
    FootnoteShape = TAG_BEGIN + 58,
    PageBorderFill = TAG_BEGIN + 59,
    ShapeComponent = TAG_BEGIN + 60,
    Table = TAG_BEGIN + 61,
    ShapeComponentLine = TAG_BEGIN + 62,
    ShapeComponentRectangle = TAG_BEGIN + 63,
    ShapeComponentEllipse = TAG_BEGIN + 64,
    ShapeComponentArc = TAG_BEGIN + 65,
    ShapeComponentPolygon = TAG_BEGIN + 66,
    ShapeComponentCurve = TAG_BEGIN + 67,
    ShapeComponentOle = TAG_BEGIN + 68,
    ShapeComponentPicture = TAG_BEGIN + 69,
    ShapeComponentContainer = TAG_BEGIN + 70,
    CtrlData = TAG_BEGIN + 71,
    EqEdit = TAG_BEGIN + 72,
    ShapeComponentTextArt = TAG_BEGIN + 74,
    FormObject = TAG_BEGIN + 75,
    MemoList = TAG_BEGIN + 77,
    ChartData = TAG_BEGIN + 79,
    VideoData = TAG_BEGIN + 82,
    ShapeComponentUnknown = TAG_BEGIN + 99,
}

impl HwpTag {
    /// Looks up a raw tag value. Unknown values yield `None`.
    pub fn from_raw(raw: u16) -> Option<Self> {
        Self::try_from(raw).ok()
    }

    pub fn raw(self) -> u16 {
        self as u16
    }
}
