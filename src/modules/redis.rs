use redis::{Client, Commands, Connection, FromRedisValue, RedisResult, ToRedisArgs};

pub struct Redis {}

impl Redis {
    pub fn open(redis_url: &str) -> RedisResult<Client> {
        Client::open(redis_url)
    }

    /// a new connection is opened per call, the client itself is cheap to keep around.
    pub fn connect(client: &Client) -> RedisResult<Connection> {
        client.get_connection()
    }

    pub fn set_data<K: ToRedisArgs, D: ToRedisArgs>(
        conn: &mut Connection,
        key: K,
        data: D,
    ) -> RedisResult<()> {
        conn.set::<K, D, ()>(key, data)
    }

    pub fn get_data<K: ToRedisArgs, D: FromRedisValue>(
        conn: &mut Connection,
        key: K,
    ) -> RedisResult<D> {
        conn.get::<K, D>(key)
    }
}
