//! ICM bridge contract ABI definition
//!
//! Uses alloy's sol! macro to generate type-safe bindings for the deployed
//! bridge contract. The contract itself is external; only its interface is
//! declared here.

#![allow(clippy::too_many_arguments)]

use alloy::sol;

sol! {
    /// ICM token bridge contract interface
    #[sol(rpc)]
    contract ICMBridge {
        /// Outstanding bridge transfer recorded by the source-side contract
        struct PendingTransaction {
            address user;
            uint256 amount;
            bytes32 destinationChain;
            uint256 timestamp;
            bool completed;
            address token;
            string messageType;
        }

        /// Per-token bridging rules
        struct TokenConfig {
            bool isWhitelisted;
            bool isNative;
            address counterpartToken;
            uint256 minBridgeAmount;
            uint256 maxBridgeAmount;
        }

        // Views
        function getPendingTransaction(bytes32 txId) external view returns (PendingTransaction memory);
        function isMessageProcessed(bytes32 messageHash) external view returns (bool);
        function getLockedBalance(address token) external view returns (uint256);
        function getMintedBalance(address token) external view returns (uint256);
        function getTokenConfig(address token) external view returns (TokenConfig memory);
        function isChainEnabled(bytes32 chainId) external view returns (bool);
        function bridgeFee() external view returns (uint256);
        function totalFeesCollected() external view returns (uint256);
        function feeRecipient() external view returns (address);
        function userNonces(address user) external view returns (uint256);
        function CHAIN_ID() external view returns (bytes32);
        function owner() external view returns (address);
        function paused() external view returns (bool);

        /// Lock native-side tokens and emit an ICM message to the destination chain.
        /// The bridge fee is paid as msg.value.
        function lockAndBridge(bytes32 destinationChain, uint256 amount, address token) external payable;

        /// Burn wrapped tokens and emit an ICM message back to the source chain.
        function burnAndBridge(bytes32 sourceChain, uint256 amount, address token) external payable;

        // Admin (owner only)
        function whitelistToken(
            address token,
            bool isNative,
            address counterpartToken,
            uint256 minAmount,
            uint256 maxAmount
        ) external;
        function blacklistToken(address token) external;
        function enableChain(bytes32 chainId, address bridgeAddress) external;
        function disableChain(bytes32 chainId) external;
        function setBridgeFee(uint256 newFee) external;
        function setFeeRecipient(address newRecipient) external;
        function pause() external;
        function unpause() external;
        function withdrawFees() external;
        function emergencyWithdraw(address token, uint256 amount) external;
        function emergencyWithdrawETH() external;

        /// Events
        event TokensLocked(
            address indexed user,
            uint256 amount,
            bytes32 indexed destinationChain,
            bytes32 indexed txId,
            address token
        );

        event TokensMinted(
            address indexed user,
            uint256 amount,
            bytes32 indexed sourceChain,
            bytes32 indexed txId,
            address token
        );

        event TokensBurned(
            address indexed user,
            uint256 amount,
            bytes32 indexed destinationChain,
            bytes32 indexed txId,
            address token
        );

        event TokensUnlocked(
            address indexed user,
            uint256 amount,
            bytes32 indexed sourceChain,
            bytes32 indexed txId,
            address token
        );

        event ICMMessageSent(
            bytes32 indexed destinationChain,
            bytes32 indexed messageId,
            string messageType
        );

        event ICMMessageReceived(
            bytes32 indexed sourceChain,
            bytes32 indexed messageId,
            string messageType
        );
    }
}
