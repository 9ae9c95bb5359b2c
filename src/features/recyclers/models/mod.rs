mod center;

pub use center::RecyclerCenter;
