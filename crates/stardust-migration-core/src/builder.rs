//! Per-output fragments and final coin aggregation.

use move_core_types::account_address::AccountAddress;
use tracing::{debug, info};

use crate::config::MigrationConfig;
use crate::error::GraphError;
use crate::graph::{
    AddressHandle, BagHandle, CoinHandle, GraphBuilder, MigrationGraph, NftHandle, Transferable,
};
use crate::output::{BasicOutput, NftOutput, StardustOutput};

/// Builds the migration graph for one destination address.
///
/// Each `add_*` call appends one output's fragment:
///
/// 1. extract the output's assets
/// 2. convert the balance to a coin (kept for aggregation)
/// 3. one `extract_and_send_to` per token type, threading the bag
/// 4. destroy the emptied bag
///
/// [`finish`](Self::finish) merges all coins into the first one (basic coins
/// before NFT coins) and transfers it together with all NFTs.
pub struct MigrationGraphBuilder {
    graph: GraphBuilder,
    destination: AddressHandle,
    basic_coins: Vec<CoinHandle>,
    nft_coins: Vec<CoinHandle>,
    nfts: Vec<NftHandle>,
    tokens_sent: usize,
}

impl MigrationGraphBuilder {
    pub fn new(config: &MigrationConfig, destination: AccountAddress) -> Result<Self, GraphError> {
        let mut graph = GraphBuilder::new(config);
        let destination = graph.address(destination)?;
        Ok(Self {
            graph,
            destination,
            basic_coins: Vec::new(),
            nft_coins: Vec::new(),
            nfts: Vec::new(),
            tokens_sent: 0,
        })
    }

    pub fn add_basic_output(
        &mut self,
        output: &BasicOutput,
        token_types: &[String],
    ) -> Result<(), GraphError> {
        let input = self.graph.output_object(output.id())?;
        let (balance, bag) = self.graph.extract_basic_assets(input)?;
        let coin = self.graph.balance_to_coin(balance)?;
        self.basic_coins.push(coin);
        self.drain_bag(bag, token_types)?;
        debug!(
            output = %output.id().to_hex_literal(),
            tokens = token_types.len(),
            "added basic output"
        );
        Ok(())
    }

    pub fn add_nft_output(
        &mut self,
        output: &NftOutput,
        token_types: &[String],
    ) -> Result<(), GraphError> {
        let input = self.graph.output_object(output.id())?;
        let (balance, bag, nft) = self.graph.extract_nft_assets(input)?;
        self.nfts.push(nft);
        let coin = self.graph.balance_to_coin(balance)?;
        self.nft_coins.push(coin);
        self.drain_bag(bag, token_types)?;
        debug!(
            output = %output.id().to_hex_literal(),
            tokens = token_types.len(),
            "added NFT output"
        );
        Ok(())
    }

    fn drain_bag(&mut self, mut bag: BagHandle, token_types: &[String]) -> Result<(), GraphError> {
        for token_type in token_types {
            bag = self.graph.extract_and_send(token_type, bag, self.destination)?;
        }
        self.tokens_sent += token_types.len();
        self.graph.destroy_empty_bag(bag)
    }

    /// Aggregate coins, transfer everything and validate the result.
    pub fn finish(mut self) -> Result<MigrationGraph, GraphError> {
        let coin_count = self.basic_coins.len() + self.nft_coins.len();
        let nft_count = self.nfts.len();

        let mut coins = self.basic_coins.into_iter().chain(self.nft_coins);
        let mut objects: Vec<Transferable> = Vec::with_capacity(1 + nft_count);
        if let Some(primary) = coins.next() {
            let rest: Vec<CoinHandle> = coins.collect();
            if !rest.is_empty() {
                self.graph.merge_coins(&primary, rest)?;
            }
            objects.push(primary.into());
        }
        objects.extend(self.nfts.into_iter().map(Transferable::from));

        if !objects.is_empty() {
            self.graph.transfer_objects(objects, self.destination)?;
        }

        let graph = self.graph.finish()?;
        info!(
            operations = graph.len(),
            coins = coin_count,
            nfts = nft_count,
            native_tokens = self.tokens_sent,
            "built migration graph"
        );
        Ok(graph)
    }
}
