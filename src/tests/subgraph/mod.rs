//! The subgraph pool provider against a mock GraphQL endpoint.

use {
    crate::{
        domain::{
            pool::{PoolId, math::SwapKind, source::PoolDataProvider},
            vault::VaultModel,
        },
        infra::subgraph::{self, Subgraph, dto},
        tests::{self, A, B, mock},
    },
    serde_json::json,
    std::time::Duration,
};

const PATH: &str = "subgraphs/name/balancer-v2";

fn pool(byte: u8) -> serde_json::Value {
    let id = tests::pool_id(byte);
    json!({
        "id": id.0,
        "address": id.address(),
        "poolType": "Weighted",
        "swapFee": "0.003",
        "totalShares": "2000",
        "amp": null,
        "tokens": [
            { "address": A, "decimals": 18, "balance": "1000", "weight": "0.5" },
            { "address": B, "decimals": 18, "balance": "1000", "weight": "0.5" },
        ],
    })
}

fn page(first: usize, skip: usize, pools: Vec<serde_json::Value>) -> mock::http::Expectation {
    mock::http::Expectation {
        path: PATH.to_owned(),
        req: mock::http::RequestBody::Exact(json!({
            "query": dto::pools_query::QUERY,
            "variables": {
                "first": first,
                "skip": skip,
                "poolTypes": dto::POOL_TYPES,
            },
        })),
        res: mock::http::Response::Json(json!({ "data": { "pools": pools } })),
    }
}

fn subgraph(api: &mock::http::ServerHandle, page_size: usize, pool_ids: Vec<PoolId>) -> Subgraph {
    Subgraph::new(subgraph::Config {
        url: api.url(PATH),
        pool_ids,
        page_size,
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

#[tokio::test]
async fn fetches_all_pages() {
    let api = mock::http::setup(vec![
        page(2, 0, vec![pool(0x01), pool(0x02)]),
        page(2, 2, vec![pool(0x03)]),
    ])
    .await;

    let pools = subgraph(&api, 2, vec![]).fetch_pools().await.unwrap();

    assert_eq!(
        pools.iter().map(|pool| pool.id).collect::<Vec<_>>(),
        vec![tests::pool_id(0x01), tests::pool_id(0x02), tests::pool_id(0x03)]
    );
}

/// A full last page needs one more, empty, page to know it was the last.
#[tokio::test]
async fn stops_on_empty_page() {
    let api = mock::http::setup(vec![
        page(1, 0, vec![pool(0x01)]),
        page(1, 1, vec![]),
    ])
    .await;

    let pools = subgraph(&api, 1, vec![]).fetch_pools().await.unwrap();

    assert_eq!(pools.len(), 1);
}

/// Pages larger than the subgraph serves are requested at the maximum size,
/// so a full page still continues the listing.
#[tokio::test]
async fn clamps_page_size_to_subgraph_maximum() {
    let full = (0..subgraph::MAX_PAGE_SIZE)
        .map(|i| pool(i as u8))
        .collect::<Vec<_>>();
    let api = mock::http::setup(vec![
        page(subgraph::MAX_PAGE_SIZE, 0, full),
        page(subgraph::MAX_PAGE_SIZE, subgraph::MAX_PAGE_SIZE, vec![]),
    ])
    .await;

    let pools = subgraph(&api, 5000, vec![]).pools().await.unwrap();

    assert_eq!(pools.len(), subgraph::MAX_PAGE_SIZE);
}

#[tokio::test]
async fn filters_by_pool_id() {
    let id = tests::pool_id(0x01);
    let api = mock::http::setup(vec![mock::http::Expectation {
        path: PATH.to_owned(),
        req: mock::http::RequestBody::Exact(json!({
            "query": dto::pools_query::BY_ID_QUERY,
            "variables": {
                "first": 10,
                "skip": 0,
                "poolTypes": dto::POOL_TYPES,
                "ids": [id.to_string()],
            },
        })),
        res: mock::http::Response::Json(json!({ "data": { "pools": [pool(0x01)] } })),
    }])
    .await;

    let pools = subgraph(&api, 10, vec![id]).fetch_pools().await.unwrap();

    assert_eq!(pools.len(), 1);
}

#[tokio::test]
async fn graphql_errors_fail_the_fetch() {
    let api = mock::http::setup(vec![mock::http::Expectation {
        path: PATH.to_owned(),
        req: mock::http::RequestBody::Any,
        res: mock::http::Response::Json(json!({
            "errors": [{ "message": "indexing error" }],
        })),
    }])
    .await;

    let err = subgraph(&api, 10, vec![]).pools().await.unwrap_err();

    assert!(matches!(err, subgraph::Error::GraphQl(message) if message == "indexing error"));
}

#[tokio::test]
async fn http_errors_fail_the_fetch() {
    let api = mock::http::setup(vec![mock::http::Expectation {
        path: PATH.to_owned(),
        req: mock::http::RequestBody::Any,
        res: mock::http::Response::Status(502),
    }])
    .await;

    let err = subgraph(&api, 10, vec![]).pools().await.unwrap_err();

    assert!(matches!(
        err,
        subgraph::Error::Http(crate::util::http::Error::Status(status, _))
            if status.as_u16() == 502
    ));
}

#[tokio::test]
async fn simulates_against_subgraph_pools() {
    let api = mock::http::setup(vec![page(10, 0, vec![pool(0x01)])]).await;
    let mut model = VaultModel::new(Box::new(subgraph(&api, 10, vec![])));

    let deltas = model
        .multicall(
            &[tests::swap(
                tests::pool_id(0x01),
                SwapKind::GivenIn,
                (A, B),
                tests::ether(1),
                None,
                None,
            )],
            false,
        )
        .await
        .unwrap();

    assert_eq!(deltas.get(&A), -tests::signed(tests::ether(1)));
    assert!(deltas.get(&B) > crate::domain::eth::I256::ZERO);
}
