//! End-to-end scenarios on a local chain.

use std::collections::HashMap;

use super::*;
use crate::contracts::chain::LocalChain;
use crate::contracts::env::CallEnv;
use crate::contracts::{Contract, ContractError, ContractResult, ExecutionResult};
use crate::crypto::{Hash, Keypair};
use crate::marketplace::MarketplaceCall;
use crate::types::{Address, Amount, Id, Timestamp, DAY_MS};

const GENESIS: Timestamp = 1_700_000_000_000;

/// Fixed-price marketplace; records the buyer of each asset
struct TestMarket {
    address: Address,
    prices: HashMap<(Address, u64), Amount>,
}

impl Contract for TestMarket {
    fn address(&self) -> Address {
        self.address
    }

    fn name(&self) -> &str {
        "TestMarket"
    }

    fn version(&self) -> u32 {
        1
    }

    fn call(&self, env: &mut CallEnv<'_, '_>, input: &[u8]) -> ContractResult<Vec<u8>> {
        match MarketplaceCall::decode(input)? {
            MarketplaceCall::Price {
                asset_contract,
                asset_id,
            } => {
                let price = self
                    .prices
                    .get(&(asset_contract, asset_id))
                    .ok_or_else(|| ContractError::ExecutionFailed("unlisted".into()))?;
                Ok(bincode::serialize(price).unwrap())
            }
            MarketplaceCall::Buy {
                asset_contract,
                asset_id,
            } => {
                let price = self.prices[&(asset_contract, asset_id)];
                if env.value() != price {
                    return Err(ContractError::ExecutionFailed("wrong payment".into()));
                }
                let mut key = asset_contract.as_bytes().to_vec();
                key.extend_from_slice(&asset_id.to_le_bytes());
                env.storage_write(key, env.caller().as_bytes().to_vec());
                Ok(Vec::new())
            }
        }
    }
}

/// Counts calls; reverts on `b"revert"`
struct Sink(Address);

impl Contract for Sink {
    fn address(&self) -> Address {
        self.0
    }

    fn name(&self) -> &str {
        "Sink"
    }

    fn version(&self) -> u32 {
        1
    }

    fn call(&self, env: &mut CallEnv<'_, '_>, input: &[u8]) -> ContractResult<Vec<u8>> {
        if input == b"revert" {
            return Err(ContractError::ExecutionFailed("sink reverted".into()));
        }
        let count = env.storage_read(b"count").map_or(0, |b| b[0]) + 1;
        env.storage_write(b"count".to_vec(), vec![count]);
        Ok(Vec::new())
    }
}

/// Joins the DAO on `b"join"`, stores a call on `b"set:..."`, and replays
/// the stored call into the DAO on anything else
struct Reentrant {
    address: Address,
    dao: Address,
}

impl Contract for Reentrant {
    fn address(&self) -> Address {
        self.address
    }

    fn name(&self) -> &str {
        "Reentrant"
    }

    fn version(&self) -> u32 {
        1
    }

    fn call(&self, env: &mut CallEnv<'_, '_>, input: &[u8]) -> ContractResult<Vec<u8>> {
        if input == b"join" {
            let subscribe = DaoCall::Subscribe.encode()?;
            return env.call(self.dao, Amount::from_coins(1), &subscribe);
        }
        if let Some(stored) = input.strip_prefix(b"set:") {
            env.storage_write(b"replay".to_vec(), stored.to_vec());
            return Ok(Vec::new());
        }
        let replay = env.storage_read(b"replay").unwrap_or_default();
        env.call(self.dao, Amount::ZERO, &replay)
    }
}

struct Club {
    chain: LocalChain,
    dao: Address,
    market: Address,
    sink: Address,
    members: Vec<Keypair>,
}

fn keypair(n: u8) -> Keypair {
    Keypair::from_seed(&[n; 32])
}

fn addr(kp: &Keypair) -> Address {
    Address::from_public_key(kp.public_key())
}

fn gov(result: ContractResult<ExecutionResult>) -> GovernanceError {
    match result {
        Ok(_) => panic!("expected a governance error"),
        Err(e) => *e
            .governance()
            .unwrap_or_else(|| panic!("not a governance error: {e}")),
    }
}

impl Club {
    /// Empty club; `n` funded accounts, none of them members yet
    fn new(n: u8) -> Self {
        Self::on_chain(n, 1)
    }

    /// Empty club running on chain `chain_id`
    fn on_chain(n: u8, chain_id: u64) -> Self {
        let mut chain = LocalChain::new(chain_id, GENESIS);
        let deployer = Address::from_bytes([0xde; 20]);
        let dao = Address::for_contract(&deployer, "collector-dao");
        let market = Address::for_contract(&deployer, "market");
        let sink = Address::for_contract(&deployer, "sink");
        let asset = Address::from_bytes([0xa5; 20]);

        chain
            .deploy(Box::new(CollectorDao::new(dao, GovernanceConfig::default(), market)))
            .unwrap();
        chain
            .deploy(Box::new(TestMarket {
                address: market,
                prices: HashMap::from([((asset, 1), Amount::from_coins(2)), ((asset, 2), Amount::from_coins(50))]),
            }))
            .unwrap();
        chain.deploy(Box::new(Sink(sink))).unwrap();

        let members: Vec<Keypair> = (1..=n).map(keypair).collect();
        for kp in &members {
            chain.fund(addr(kp), Amount::from_coins(100));
        }
        Self {
            chain,
            dao,
            market,
            sink,
            members,
        }
    }

    /// `n` accounts that each deposited 1 coin at genesis
    fn with_members(n: u8) -> Self {
        let mut club = Self::new(n);
        for i in 0..n as usize {
            club.pay(i, Amount::from_coins(1), &DaoCall::Subscribe).unwrap();
        }
        club
    }

    fn pay(&mut self, who: usize, value: Amount, call: &DaoCall) -> ContractResult<ExecutionResult> {
        let input = call.encode().unwrap();
        self.chain.submit(&self.members[who], self.dao, value, input)
    }

    fn send(&mut self, who: usize, call: &DaoCall) -> ContractResult<ExecutionResult> {
        self.pay(who, Amount::ZERO, call)
    }

    fn query<T: serde::de::DeserializeOwned>(&mut self, call: &DaoCall) -> ContractResult<T> {
        let out = self.chain.query(Address::ZERO, self.dao, &call.encode().unwrap())?;
        Ok(bincode::deserialize(&out).unwrap())
    }

    fn state(&mut self, id: Id) -> ProposalState {
        let code: u8 = self.query(&DaoCall::ProposalState { proposal_id: id }).unwrap();
        ProposalState::from_code(code).unwrap()
    }

    fn total_members(&mut self) -> u64 {
        self.query(&DaoCall::TotalMembers).unwrap()
    }

    fn is_member(&mut self, who: usize) -> bool {
        let member = addr(&self.members[who]);
        self.query(&DaoCall::IsMember { member }).unwrap()
    }

    fn has_voted(&mut self, id: Id, who: usize) -> bool {
        let voter = addr(&self.members[who]);
        self.query(&DaoCall::HasVoted { proposal_id: id, voter }).unwrap()
    }

    fn proposal(&mut self, id: Id) -> Proposal {
        self.query(&DaoCall::GetProposal { proposal_id: id }).unwrap()
    }

    fn create(&mut self, who: usize, draft: &Draft) -> ContractResult<ExecutionResult> {
        self.send(who, &draft.create_call())
    }

    fn propose(&mut self, who: usize, draft: &Draft) -> Id {
        let result = self.create(who, draft).unwrap();
        bincode::deserialize(&result.output).unwrap()
    }

    fn vote(&mut self, who: usize, id: Id, support: u8) -> ContractResult<ExecutionResult> {
        self.send(who, &DaoCall::CastVote { proposal_id: id, support })
    }

    fn execute(&mut self, who: usize, draft: &Draft) -> ContractResult<ExecutionResult> {
        self.send(who, &draft.execute_call())
    }

    fn signed(&self, who: usize, id: Id, support: u8) -> SignedBallot {
        self.signed_for_chain(who, id, support, self.chain.chain_id())
    }

    fn signed_for_chain(&self, who: usize, id: Id, support: u8, chain_id: u64) -> SignedBallot {
        let kp = &self.members[who];
        let ballot = Ballot {
            proposal_id: id,
            voter: addr(kp),
            support,
        };
        let domain = crate::crypto::SigningDomain::new("Collector DAO", chain_id, self.dao);
        SignedBallot::sign(ballot, kp, &domain)
    }

    fn open_voting(&mut self) {
        self.chain.advance(2 * DAY_MS + 1);
    }

    fn close_voting(&mut self) {
        self.chain.advance(3 * DAY_MS);
    }
}

#[derive(Clone)]
struct Draft {
    targets: Vec<Address>,
    values: Vec<Amount>,
    call_payloads: Vec<Vec<u8>>,
    description: String,
}

impl Draft {
    fn single(target: Address, value: Amount, payload: Vec<u8>, description: &str) -> Self {
        Self {
            targets: vec![target],
            values: vec![value],
            call_payloads: vec![payload],
            description: description.into(),
        }
    }

    fn id(&self) -> Id {
        compute_proposal_id(
            &self.targets,
            &self.values,
            &self.call_payloads,
            &description_digest(&self.description),
        )
    }

    fn create_call(&self) -> DaoCall {
        DaoCall::CreateProposal {
            targets: self.targets.clone(),
            values: self.values.clone(),
            call_payloads: self.call_payloads.clone(),
            description: self.description.clone(),
        }
    }

    fn execute_call(&self) -> DaoCall {
        DaoCall::Execute {
            targets: self.targets.clone(),
            values: self.values.clone(),
            call_payloads: self.call_payloads.clone(),
            description_digest: description_digest(&self.description),
        }
    }
}

fn buy_draft(club: &Club, asset_id: u64, max_allowed: Amount) -> Draft {
    let payload = DaoCall::BuyAsset {
        asset_contract: Address::from_bytes([0xa5; 20]),
        asset_id,
        max_allowed,
    }
    .encode()
    .unwrap();
    Draft::single(club.dao, Amount::ZERO, payload, "buy a punk")
}

/// Proposal by member 0 that `for_votes` members vote for
fn passed(club: &mut Club, draft: &Draft, for_votes: usize) -> Id {
    let id = club.propose(0, draft);
    club.open_voting();
    for i in 0..for_votes {
        club.vote(i, id, 2).unwrap();
    }
    club.close_voting();
    assert_eq!(club.state(id), ProposalState::Succeeded);
    id
}

// --- membership ---

#[test]
fn test_single_large_deposit_makes_sole_member() {
    let mut club = Club::new(2);
    let result = club.pay(0, Amount::from_coins(10), &DaoCall::Subscribe).unwrap();

    assert!(club.is_member(0));
    assert!(!club.is_member(1));
    assert_eq!(club.total_members(), 1);
    assert_eq!(club.chain.balance(&club.dao), Amount::from_coins(10));
    assert_eq!(
        DaoEvent::decode(&result.events[0]),
        Some(DaoEvent::Subscribed {
            member: addr(&club.members[0]),
            amount: Amount::from_coins(10)
        })
    );
}

#[test]
fn test_membership_after_cumulative_threshold() {
    let mut club = Club::new(1);
    let half = Amount::from_millicoins(500);

    club.pay(0, half, &DaoCall::Subscribe).unwrap();
    assert!(!club.is_member(0));
    assert_eq!(club.total_members(), 0);

    club.chain.advance(1_000);
    club.pay(0, half, &DaoCall::Subscribe).unwrap();
    assert!(club.is_member(0));
    assert_eq!(club.total_members(), 1);

    club.pay(0, Amount::from_coins(3), &DaoCall::Subscribe).unwrap();
    assert_eq!(club.total_members(), 1);
}

#[test]
fn test_member_since_is_qualification_time() {
    let mut club = Club::new(2);
    club.pay(0, Amount::from_millicoins(500), &DaoCall::Subscribe).unwrap();
    club.pay(1, Amount::from_coins(1), &DaoCall::Subscribe).unwrap();
    let draft = Draft::single(club.sink, Amount::ZERO, Vec::new(), "early");
    let id = club.propose(1, &draft);

    // member 0 completes the threshold only after the proposal exists
    club.chain.advance(1);
    club.pay(0, Amount::from_millicoins(500), &DaoCall::Subscribe).unwrap();
    club.open_voting();
    assert_eq!(gov(club.vote(0, id, 2)), GovernanceError::CannotVoteForThisProposal);
    club.vote(1, id, 2).unwrap();
}

#[test]
fn test_zero_contribution_rejected() {
    let mut club = Club::new(1);
    assert_eq!(gov(club.send(0, &DaoCall::Subscribe)), GovernanceError::ZeroContribution);
}

// --- proposals ---

#[test]
fn test_create_proposal() {
    let mut club = Club::with_members(2);
    let draft = Draft::single(club.sink, Amount::ZERO, b"hello".to_vec(), "say hello");
    let result = club.create(0, &draft).unwrap();
    let id: Id = bincode::deserialize(&result.output).unwrap();
    assert_eq!(id, draft.id());

    let stored = club.proposal(id);
    assert_eq!(stored.proposer, addr(&club.members[0]));
    assert_eq!(stored.created_at, GENESIS);
    assert_eq!(stored.description_digest, description_digest("say hello"));
    assert!(!stored.executed);

    let ids: Vec<Id> = club.query(&DaoCall::ProposalIds).unwrap();
    assert_eq!(ids, vec![id]);

    match DaoEvent::decode(&result.events[0]) {
        Some(DaoEvent::ProposalCreated { id: event_id, created_at, .. }) => {
            assert_eq!(event_id, id);
            assert_eq!(created_at, GENESIS);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(club.state(id), ProposalState::Pending);
}

#[test]
fn test_proposal_index_grows_one_slot_per_proposal() {
    let mut club = Club::with_members(1);
    let ids: Vec<Id> = ["first", "second", "third"]
        .iter()
        .map(|d| club.propose(0, &Draft::single(club.sink, Amount::ZERO, Vec::new(), d)))
        .collect();

    let listed: Vec<Id> = club.query(&DaoCall::ProposalIds).unwrap();
    assert_eq!(listed, ids);

    let dao = club.dao;
    let (count, second) = club.chain.inspect(|state| {
        (
            store::load::<u64>(state, &dao, store::KEY_PROPOSAL_COUNT).unwrap(),
            store::load::<Id>(state, &dao, &store::proposal_index_key(1)).unwrap(),
        )
    });
    assert_eq!(count, Some(3));
    assert_eq!(second, Some(ids[1]));
}

#[test]
fn test_create_proposal_rejections() {
    let mut club = Club::with_members(1);
    club.members.push(keypair(99));
    club.chain.fund(addr(&club.members[1]), Amount::from_coins(5));

    let draft = Draft::single(club.sink, Amount::ZERO, Vec::new(), "x");
    assert_eq!(gov(club.create(1, &draft)), GovernanceError::NotAMember);

    let empty = Draft {
        targets: Vec::new(),
        values: Vec::new(),
        call_payloads: Vec::new(),
        description: "nothing".into(),
    };
    assert_eq!(gov(club.create(0, &empty)), GovernanceError::EmptyProposal);

    let mut uneven = draft.clone();
    uneven.values.push(Amount::ZERO);
    assert_eq!(gov(club.create(0, &uneven)), GovernanceError::InvalidLength);

    club.create(0, &draft).unwrap();
    assert_eq!(gov(club.create(0, &draft)), GovernanceError::AlreadyExists);
}

#[test]
fn test_unknown_proposal() {
    let mut club = Club::with_members(1);
    let missing = Hash::from_bytes([7; 32]);
    assert_eq!(gov(club.vote(0, missing, 2)), GovernanceError::ProposalNotFound);
    let draft = Draft::single(club.sink, Amount::ZERO, Vec::new(), "never made");
    assert_eq!(gov(club.execute(0, &draft)), GovernanceError::ProposalNotFound);
    let err = club
        .query::<u8>(&DaoCall::ProposalState { proposal_id: missing })
        .unwrap_err();
    assert_eq!(err.governance(), Some(&GovernanceError::ProposalNotFound));
}

// --- voting windows ---

#[test]
fn test_voting_window() {
    let mut club = Club::with_members(4);
    let draft = Draft::single(club.sink, Amount::ZERO, Vec::new(), "timing");
    let id = club.propose(0, &draft);

    assert_eq!(gov(club.vote(0, id, 2)), GovernanceError::NotAnActiveProposal);

    club.open_voting();
    assert_eq!(club.state(id), ProposalState::Active);
    club.vote(0, id, 2).unwrap();
    club.vote(1, id, 2).unwrap();

    club.close_voting();
    assert_eq!(gov(club.vote(2, id, 2)), GovernanceError::NotAnActiveProposal);

    club.chain.advance(2 * DAY_MS);
    assert_eq!(club.state(id), ProposalState::Expired);
    assert_eq!(gov(club.vote(3, id, 2)), GovernanceError::NotAnActiveProposal);
    assert_eq!(gov(club.execute(0, &draft)), GovernanceError::NotReadyToExecute);
}

#[test]
fn test_vote_checks() {
    let mut club = Club::with_members(2);
    let id = club.propose(0, &Draft::single(club.sink, Amount::ZERO, Vec::new(), "checks"));
    club.open_voting();

    assert_eq!(gov(club.vote(0, id, 3)), GovernanceError::NotAValidChoice);
    club.vote(0, id, 1).unwrap();
    assert_eq!(gov(club.vote(0, id, 2)), GovernanceError::AlreadyVoted);

    let p = club.proposal(id);
    assert_eq!((p.votes_for, p.votes_against, p.votes_abstain), (0, 0, 1));
    assert!(club.has_voted(id, 0));
    assert!(!club.has_voted(id, 1));
}

#[test]
fn test_majority_of_eleven() {
    let mut club = Club::with_members(11);
    let id = club.propose(0, &Draft::single(club.sink, Amount::ZERO, Vec::new(), "majority"));
    club.open_voting();
    for (who, support) in [(0, 2), (1, 2), (2, 2), (3, 2), (4, 0), (5, 0), (6, 1)] {
        club.vote(who, id, support).unwrap();
    }
    club.close_voting();
    assert_eq!(club.state(id), ProposalState::Succeeded);
}

#[test]
fn test_majority_against() {
    let mut club = Club::with_members(11);
    let id = club.propose(0, &Draft::single(club.sink, Amount::ZERO, Vec::new(), "against"));
    club.open_voting();
    for (who, support) in [(0, 2), (1, 2), (2, 0), (3, 0), (4, 0), (5, 1), (6, 1)] {
        club.vote(who, id, support).unwrap();
    }
    club.close_voting();
    assert_eq!(club.state(id), ProposalState::Defeated);
}

#[test]
fn test_quorum_not_met() {
    let mut club = Club::with_members(11);
    let draft = Draft::single(club.sink, Amount::ZERO, Vec::new(), "lonely");
    let id = club.propose(0, &draft);
    club.open_voting();
    club.vote(0, id, 2).unwrap();
    club.close_voting();
    assert_eq!(club.state(id), ProposalState::Defeated);
    assert_eq!(gov(club.execute(0, &draft)), GovernanceError::NotReadyToExecute);
}

// --- signed ballots ---

#[test]
fn test_vote_by_signature_relayed() {
    let mut club = Club::with_members(3);
    let id = club.propose(0, &Draft::single(club.sink, Amount::ZERO, Vec::new(), "relay"));
    club.open_voting();

    let ballot = club.signed(1, id, 2);
    let result = club.send(2, &DaoCall::CastVoteBySignature { ballot }).unwrap();
    assert!(club.has_voted(id, 1));
    assert!(!club.has_voted(id, 2));
    assert_eq!(
        DaoEvent::decode(&result.events[0]),
        Some(DaoEvent::VoteCast {
            id,
            voter: addr(&club.members[1]),
            support: 2
        })
    );

    // same voter, other entry point
    assert_eq!(gov(club.vote(1, id, 0)), GovernanceError::AlreadyVoted);
}

#[test]
fn test_vote_by_signature_rejections() {
    let mut club = Club::with_members(2);
    let id = club.propose(0, &Draft::single(club.sink, Amount::ZERO, Vec::new(), "sigs"));

    // signature is checked before the proposal phase
    let mut forged = club.signed(1, id, 2);
    forged.ballot.support = 0;
    assert_eq!(
        gov(club.send(0, &DaoCall::CastVoteBySignature { ballot: forged })),
        GovernanceError::InvalidSignature
    );

    let mut wrong_signer = club.signed(1, id, 2);
    wrong_signer.signer = *club.members[0].public_key();
    assert_eq!(
        gov(club.send(0, &DaoCall::CastVoteBySignature { ballot: wrong_signer })),
        GovernanceError::InvalidSignature
    );

    club.open_voting();
    let outsider = keypair(77);
    let ballot = Ballot {
        proposal_id: id,
        voter: addr(&outsider),
        support: 2,
    };
    let signed = SignedBallot::sign(ballot, &outsider, &crate::crypto::SigningDomain::new("Collector DAO", 1, club.dao));
    assert_eq!(
        gov(club.send(0, &DaoCall::CastVoteBySignature { ballot: signed })),
        GovernanceError::NotAMember
    );
}

#[test]
fn test_ballot_bound_to_running_chain() {
    // configured chain id stays at the default of 1
    let mut club = Club::on_chain(2, 5);
    for i in 0..2 {
        club.pay(i, Amount::from_coins(1), &DaoCall::Subscribe).unwrap();
    }
    let id = club.propose(0, &Draft::single(club.sink, Amount::ZERO, Vec::new(), "chain five"));
    club.open_voting();

    let replayed = club.signed_for_chain(1, id, 2, 1);
    assert_eq!(
        gov(club.send(0, &DaoCall::CastVoteBySignature { ballot: replayed })),
        GovernanceError::InvalidSignature
    );
    assert!(!club.has_voted(id, 1));

    let ballot = club.signed(1, id, 2);
    club.send(0, &DaoCall::CastVoteBySignature { ballot }).unwrap();
    assert!(club.has_voted(id, 1));
}

#[test]
fn test_batch_is_all_or_nothing() {
    let mut club = Club::with_members(3);
    let id = club.propose(0, &Draft::single(club.sink, Amount::ZERO, Vec::new(), "batch"));
    club.open_voting();

    let good = club.signed(0, id, 2);
    let bad = club.signed(1, id, 5);
    let batch = DaoCall::CastVoteBySignatureBatch {
        ballots: vec![good.ballot, bad.ballot],
        signatures: vec![(good.signer, good.signature), (bad.signer, bad.signature)],
    };
    assert_eq!(gov(club.send(2, &batch)), GovernanceError::NotAValidChoice);
    assert!(!club.has_voted(id, 0));
    assert_eq!(club.proposal(id).votes_for, 0);

    let uneven = DaoCall::CastVoteBySignatureBatch {
        ballots: vec![good.ballot],
        signatures: Vec::new(),
    };
    assert_eq!(gov(club.send(2, &uneven)), GovernanceError::InvalidLength);

    let empty = DaoCall::CastVoteBySignatureBatch {
        ballots: Vec::new(),
        signatures: Vec::new(),
    };
    assert!(club.send(2, &empty).unwrap().events.is_empty());

    let second = club.signed(1, id, 0);
    let ok = DaoCall::CastVoteBySignatureBatch {
        ballots: vec![good.ballot, second.ballot],
        signatures: vec![(good.signer, good.signature), (second.signer, second.signature)],
    };
    let result = club.send(2, &ok).unwrap();
    assert_eq!(result.events.len(), 2);
    let p = club.proposal(id);
    assert_eq!((p.votes_for, p.votes_against), (1, 1));

    // a duplicate inside one batch fails the batch
    let third = club.signed(2, id, 2);
    let dup = DaoCall::CastVoteBySignatureBatch {
        ballots: vec![third.ballot, third.ballot],
        signatures: vec![(third.signer, third.signature), (third.signer, third.signature)],
    };
    assert_eq!(gov(club.send(2, &dup)), GovernanceError::AlreadyVoted);
    assert!(!club.has_voted(id, 2));
}

// --- execution ---

#[test]
fn test_execute_multi_call() {
    let mut club = Club::with_members(3);
    let payee = Address::from_bytes([0x77; 20]);
    let draft = Draft {
        targets: vec![payee, club.sink, club.sink],
        values: vec![Amount::from_coins(1), Amount::ZERO, Amount::from_millicoins(250)],
        call_payloads: vec![Vec::new(), b"a".to_vec(), b"b".to_vec()],
        description: "pay and ping".into(),
    };
    let id = passed(&mut club, &draft, 2);

    let result = club.execute(1, &draft).unwrap();
    assert_eq!(bincode::deserialize::<Id>(&result.output).unwrap(), id);
    assert_eq!(club.state(id), ProposalState::Executed);
    assert_eq!(club.chain.balance(&payee), Amount::from_coins(1));
    assert_eq!(club.chain.balance(&club.sink), Amount::from_millicoins(250));
    assert_eq!(club.chain.balance(&club.dao), Amount::from_millicoins(1_750));
    let sink = club.sink;
    assert_eq!(club.chain.inspect(|s| s.storage_read(&sink, b"count")), Some(vec![2]));
    assert_eq!(
        result.events.last().and_then(DaoEvent::decode),
        Some(DaoEvent::ProposalExecuted { id })
    );

    assert_eq!(gov(club.execute(1, &draft)), GovernanceError::NotReadyToExecute);
}

#[test]
fn test_execute_requires_member_and_success() {
    let mut club = Club::with_members(2);
    club.members.push(keypair(50));
    club.chain.fund(addr(&club.members[2]), Amount::from_coins(1));
    let draft = Draft::single(club.sink, Amount::ZERO, Vec::new(), "gate");
    let id = club.propose(0, &draft);

    assert_eq!(gov(club.execute(0, &draft)), GovernanceError::NotReadyToExecute);
    club.open_voting();
    club.vote(0, id, 2).unwrap();
    assert_eq!(gov(club.execute(0, &draft)), GovernanceError::NotReadyToExecute);
    club.close_voting();

    assert_eq!(gov(club.execute(2, &draft)), GovernanceError::NotAMember);

    let mut wrong_digest = draft.clone();
    wrong_digest.description = "gate ".into();
    assert_eq!(gov(club.execute(0, &wrong_digest)), GovernanceError::ProposalNotFound);

    club.execute(0, &draft).unwrap();
}

#[test]
fn test_failed_sub_call_reverts_everything() {
    let mut club = Club::with_members(2);
    let payee = Address::from_bytes([0x78; 20]);
    let draft = Draft {
        targets: vec![payee, club.sink],
        values: vec![Amount::from_coins(1), Amount::ZERO],
        call_payloads: vec![Vec::new(), b"revert".to_vec()],
        description: "doomed".into(),
    };
    let id = passed(&mut club, &draft, 2);

    let err = club.execute(0, &draft).unwrap_err();
    assert!(matches!(err, ContractError::ExecutionFailed(_)));
    assert_eq!(club.state(id), ProposalState::Succeeded);
    assert_eq!(club.chain.balance(&payee), Amount::ZERO);
    assert_eq!(club.chain.balance(&club.dao), Amount::from_coins(2));
}

#[test]
fn test_reentrant_execute_is_refused() {
    let mut club = Club::with_members(2);
    let reentrant = Address::for_contract(&Address::ZERO, "reentrant");
    club.chain
        .deploy(Box::new(Reentrant {
            address: reentrant,
            dao: club.dao,
        }))
        .unwrap();
    club.chain.fund(reentrant, Amount::from_coins(1));
    club.chain
        .submit(&club.members[0], reentrant, Amount::ZERO, b"join".to_vec())
        .unwrap();
    assert_eq!(club.total_members(), 3);

    let draft = Draft::single(reentrant, Amount::ZERO, b"go".to_vec(), "reenter");
    let id = passed(&mut club, &draft, 2);

    let mut set = b"set:".to_vec();
    set.extend_from_slice(&draft.execute_call().encode().unwrap());
    club.chain
        .submit(&club.members[0], reentrant, Amount::ZERO, set)
        .unwrap();

    assert_eq!(gov(club.execute(0, &draft)), GovernanceError::NotReadyToExecute);
    assert_eq!(club.state(id), ProposalState::Succeeded);
}

// --- asset purchase ---

#[test]
fn test_buy_asset_direct_call_rejected() {
    let mut club = Club::with_members(1);
    let call = DaoCall::BuyAsset {
        asset_contract: Address::from_bytes([0xa5; 20]),
        asset_id: 1,
        max_allowed: Amount::from_coins(100),
    };
    assert_eq!(gov(club.send(0, &call)), GovernanceError::CallerMustBeSelf);
}

#[test]
fn test_purchase_succeeds_through_execute() {
    let mut club = Club::with_members(3);
    let draft = buy_draft(&club, 1, Amount::from_coins(2));
    let id = passed(&mut club, &draft, 3);

    let result = club.execute(0, &draft).unwrap();
    assert_eq!(club.state(id), ProposalState::Executed);
    assert_eq!(club.chain.balance(&club.market), Amount::from_coins(2));
    assert_eq!(club.chain.balance(&club.dao), Amount::from_coins(1));

    let asset_contract = Address::from_bytes([0xa5; 20]);
    let mut key = asset_contract.as_bytes().to_vec();
    key.extend_from_slice(&1u64.to_le_bytes());
    let market = club.market;
    let dao = club.dao;
    assert_eq!(
        club.chain.inspect(|s| s.storage_read(&market, &key)),
        Some(dao.as_bytes().to_vec())
    );
    assert!(result.events.iter().filter_map(DaoEvent::decode).any(|e| e
        == DaoEvent::AssetPurchased {
            asset_contract,
            asset_id: 1,
            price: Amount::from_coins(2)
        }));
}

#[test]
fn test_purchase_price_above_cap() {
    let mut club = Club::with_members(3);
    let draft = buy_draft(&club, 1, Amount::from_coins(1));
    let id = passed(&mut club, &draft, 2);
    assert_eq!(gov(club.execute(0, &draft)), GovernanceError::InsufficientAllowance);
    assert_eq!(club.state(id), ProposalState::Succeeded);
}

#[test]
fn test_purchase_balance_below_price() {
    let mut club = Club::with_members(3);
    let draft = buy_draft(&club, 2, Amount::from_coins(100));
    let id = passed(&mut club, &draft, 2);
    assert_eq!(gov(club.execute(0, &draft)), GovernanceError::InsufficientBalance);
    assert_eq!(club.state(id), ProposalState::Succeeded);
    assert_eq!(club.chain.balance(&club.dao), Amount::from_coins(3));
}
