use std::str::FromStr;

use anyhow::anyhow;

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum Order {
    CreationDate(OrderType),
    LikeCount(OrderType),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum OrderType {
    Asc,
    Desc,
}

impl Default for Order {
    /// Newest comments first
    fn default() -> Order {
        Order::CreationDate(OrderType::Desc)
    }
}

impl FromStr for Order {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Order> {
        Ok(match s {
            "newest" => Order::CreationDate(OrderType::Desc),
            "oldest" => Order::CreationDate(OrderType::Asc),
            "most-liked" => Order::LikeCount(OrderType::Desc),
            "least-liked" => Order::LikeCount(OrderType::Asc),
            _ => {
                return Err(anyhow!(
                    "unknown order {s:?}, expected one of newest, oldest, most-liked, least-liked"
                ))
            }
        })
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Order::CreationDate(OrderType::Desc) => "newest",
            Order::CreationDate(OrderType::Asc) => "oldest",
            Order::LikeCount(OrderType::Desc) => "most-liked",
            Order::LikeCount(OrderType::Asc) => "least-liked",
        })
    }
}
