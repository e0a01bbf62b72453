mod common;
pub use self::common::{OrderBy, Query, QueryCommon, SortDirection, MAX_PAGE, PAGE_SIZE};

mod keyword_ideas;
pub use self::keyword_ideas::KeywordIdeasQuery;

mod ranked;
pub use self::ranked::RankedKeywordsQuery;

mod intersection;
pub use self::intersection::DomainIntersectionQuery;

mod backlinks;
pub use self::backlinks::{BacklinkMode, BacklinksQuery};
