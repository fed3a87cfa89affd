//! Domain models for RateStore.
//!
//! Read models derive `sqlx::FromRow` directly where every column maps onto a
//! core type. Rows that need validation go through a private row type in
//! [`crate::db`] first.

pub mod rating;
pub mod store;
pub mod user;

pub use rating::{
    AverageRating, OwnerRating, OwnerRatingSort, OwnerRatingSortColumn, Rating,
    RatingDistribution, RecentRating,
};
pub use store::{
    AdminStoreFilter, AdminStoreListing, AdminStoreSortColumn, NewStore, RecentStore, Store,
    StoreDetail, StoreFilter, StoreListing, StoreSortColumn, StoreSummary,
};
pub use user::{NewUser, User, UserFilter, UserIdentity, UserSortColumn, UserSummary};
