pub mod common;

pub use common::{
    build_whitelist_data, hash_leaf, hash_pair, hex_encode, parse_digest, read_address_list,
    verify_proof, write_file_atomic, Digest, MerkleError, MerkleTree, WhitelistData,
};
