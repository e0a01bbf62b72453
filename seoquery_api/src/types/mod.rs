mod envelope;
pub use self::envelope::{ApiResponse, ItemsResult, Page, Task, SUCCESS_STATUS};
pub(crate) use self::envelope::null_as_empty;

mod keyword;
pub use self::keyword::{
    KeywordData, KeywordInfo, KeywordProperties, MonthlySearch, SearchIntent, SearchIntentInfo,
};

mod serp;
pub use self::serp::{DomainIntersectionItem, RankedKeywordItem, RankedSerpElement, SerpItem};

mod backlink;
pub use self::backlink::BacklinkItem;
