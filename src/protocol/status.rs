// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/mysql__com_8h.html
// https://mariadb.com/kb/en/library/ok_packet/#server-status-flag
bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct Status: u16 {
        /// A transaction is currently active
        const SERVER_STATUS_IN_TRANS = 1;

        /// Autocommit mode is set
        const SERVER_STATUS_AUTOCOMMIT = 2;

        /// More results exist (more packets will follow)
        const SERVER_MORE_RESULTS_EXISTS = 8;

        const SERVER_QUERY_NO_GOOD_INDEX_USED = 16;

        const SERVER_QUERY_NO_INDEX_USED = 32;

        /// When using COM_STMT_FETCH, indicate that a cursor exists
        const SERVER_STATUS_CURSOR_EXISTS = 64;

        /// When using COM_STMT_FETCH, indicate that the last row was sent
        const SERVER_STATUS_LAST_ROW_SENT = 128;

        /// Database has been dropped
        const SERVER_STATUS_DB_DROPPED = (1 << 8);

        /// Current escape mode is "no backslash escape"
        const SERVER_STATUS_NO_BACKSLASH_ESCAPES = (1 << 9);

        /// A DDL change did have an impact on an existing table
        const SERVER_STATUS_METADATA_CHANGED = (1 << 10);

        /// The query was slower than long_query_time
        const SERVER_QUERY_WAS_SLOW = (1 << 11);

        /// This result-set contains the output parameters of a stored procedure
        const SERVER_PS_OUT_PARAMS = (1 << 12);

        /// The current transaction is a read-only transaction
        const SERVER_STATUS_IN_TRANS_READONLY = (1 << 13);

        /// Session state has changed on the server
        const SERVER_SESSION_STATE_CHANGED = (1 << 14);
    }
}
